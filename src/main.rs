//! phasegate: phase-gated development workflow CLI
//!
//! Thin command surface over the workflow engine: each subcommand maps 1:1
//! onto one engine operation, errors print the remedying command and exit
//! non-zero.

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phasegate::commands::{self, ScaffoldGenerator};
use phasegate::domain::Phase;
use phasegate::{ProjectConfig, StateStore, WorkflowEngine, WorkflowError};

#[derive(Parser)]
#[command(name = "phasegate", version, about = "Phase-gated development workflow")]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize workflow state for a project
    Init {
        /// Human-readable project name
        name: String,
    },
    /// Enter the specify phase and write the spec document
    Specify {
        /// What the feature should do
        description: String,
    },
    /// Enter the plan phase and write the plan document
    Plan,
    /// Enter the task phase and write the task breakdown
    Task,
    /// Enter the execute phase and write the implementation notes
    Execute,
    /// Enter the review phase and write the review findings
    Review,
    /// Approve the current phase
    Approve {
        /// Optional reviewer comments
        #[arg(long)]
        comments: Option<String>,
        /// Approver name (defaults from configuration)
        #[arg(long)]
        by: Option<String>,
    },
    /// Show the per-phase status table
    Status,
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), WorkflowError> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = ProjectConfig::load(Some(&root)).unwrap_or_else(|e| {
        tracing::warn!("failed to load configuration, using defaults: {e}");
        ProjectConfig::load_defaults()
    });
    let store = StateStore::with_state_dir(&root, config.workflow.state_directory.as_str());
    let engine = WorkflowEngine::new(store);
    let generator = ScaffoldGenerator;

    match cli.command {
        Command::Init { name } => {
            let state = commands::init(&engine, &name)?;
            println!("Initialized project '{}' ({})", state.project_name, state.project_id);
        }
        Command::Specify { description } => {
            run_phase_command(&engine, &generator, &config, Phase::Specify, &description)?;
        }
        Command::Plan => run_phase_command(&engine, &generator, &config, Phase::Plan, "")?,
        Command::Task => run_phase_command(&engine, &generator, &config, Phase::Task, "")?,
        Command::Execute => run_phase_command(&engine, &generator, &config, Phase::Execute, "")?,
        Command::Review => run_phase_command(&engine, &generator, &config, Phase::Review, "")?,
        Command::Approve { comments, by } => {
            let approver = by.unwrap_or_else(|| config.agent.default_approver.clone());
            let state = commands::approve(&engine, &approver, comments)?;
            println!(
                "Approved phase '{}' (approvals: {})",
                state.current_phase,
                state.current().approvals.len()
            );
        }
        Command::Status => {
            let state = engine.status()?;
            print!("{}", commands::status_report(&state));
        }
    }
    Ok(())
}

fn run_phase_command(
    engine: &WorkflowEngine,
    generator: &ScaffoldGenerator,
    config: &ProjectConfig,
    phase: Phase,
    description: &str,
) -> Result<(), WorkflowError> {
    let state = commands::run_phase(engine, generator, phase, description, &config.agent.name)?;
    println!(
        "Completed phase '{}' -> {}",
        phase,
        engine.phase_output_path(phase).display()
    );
    if commands::awaiting_approval(&state) {
        println!("This phase needs approval before advancing: run `phasegate approve`");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if let Some(remedy) = err.remedy() {
                eprintln!("Hint: {remedy}");
            }
            ExitCode::FAILURE
        }
    }
}
