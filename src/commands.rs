//! Command handlers implementing the consumer contract.
//!
//! Every handler follows the same shape: load state before any decision,
//! transition into the phase before producing its artifact, write the
//! artifact at the engine-provided path, then complete the phase with the
//! written file names. Approval-gated edges need an `approve` in between.

use crate::domain::{Phase, ProjectState, Status};
use crate::engine::WorkflowEngine;
use crate::error::Result;
use std::fs;

/// Boundary to the external collaborator that produces phase artifacts.
///
/// Real implementations call out to a language-model provider; the engine
/// only cares that some text comes back for the file it will record.
pub trait ArtifactGenerator {
    /// Produce the artifact body for `phase` given the project state and the
    /// user's description of what to build.
    fn generate(&self, state: &ProjectState, phase: Phase, description: &str) -> Result<String>;
}

/// Fallback generator that writes a minimal markdown scaffold for the phase,
/// leaving sections for a human or agent to fill in.
pub struct ScaffoldGenerator;

impl ArtifactGenerator for ScaffoldGenerator {
    fn generate(&self, state: &ProjectState, phase: Phase, description: &str) -> Result<String> {
        let title = match phase {
            Phase::Specify => "Feature Specification",
            Phase::Plan => "Implementation Plan",
            Phase::Task => "Task Breakdown",
            Phase::Execute => "Implementation Notes",
            Phase::Review => "Review Findings",
            _ => "Notes",
        };
        let body = if description.is_empty() {
            "[Fill in]".to_string()
        } else {
            description.to_string()
        };
        Ok(format!(
            "# {}: {}\n\n\
            **Project**: `{}`\n\
            **Phase**: {}\n\
            **Status**: Draft\n\n\
            ## Description\n\n\
            {}\n",
            title,
            state.project_name,
            state.project_id,
            phase.display_name(),
            body,
        ))
    }
}

/// Initialize workflow state for a project.
pub fn init(engine: &WorkflowEngine, project_name: &str) -> Result<ProjectState> {
    engine.initialize(project_name)
}

/// Run one phase end to end: transition, generate and write the artifact,
/// complete with the written file name.
pub fn run_phase(
    engine: &WorkflowEngine,
    generator: &dyn ArtifactGenerator,
    phase: Phase,
    description: &str,
    agent: &str,
) -> Result<ProjectState> {
    let state = engine.transition_phase(phase, Some(agent))?;

    let content = generator.generate(&state, phase, description)?;
    let path = engine.phase_output_path(phase);
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "wrote phase artifact");

    engine.complete_phase(&[phase.output_filename()])
}

/// Record a human approval on the current phase.
pub fn approve(
    engine: &WorkflowEngine,
    approved_by: &str,
    comments: Option<String>,
) -> Result<ProjectState> {
    engine.approve_phase(approved_by, comments)
}

/// Render the per-phase status table from freshly loaded state.
pub fn status_report(state: &ProjectState) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Project: {} ({})\nCurrent phase: {}\n\n",
        state.project_name, state.project_id, state.current_phase
    ));
    for ps in state.phases.iter() {
        let marker = if ps.phase == state.current_phase {
            ">"
        } else {
            " "
        };
        out.push_str(&format!(
            "{} {} {:<10} {:<12}",
            marker,
            ps.status.badge(),
            ps.phase.display_name(),
            ps.status.display_name(),
        ));
        if !ps.approvals.is_empty() {
            out.push_str(&format!(" approvals: {}", ps.approvals.len()));
        }
        if !ps.output_files.is_empty() {
            out.push_str(&format!(" files: {}", ps.output_files.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// Whether the current phase still needs a human approval before the next
/// gated transition. Derived fresh from state, never cached.
pub fn awaiting_approval(state: &ProjectState) -> bool {
    let next = state.current_phase.next_phase();
    crate::domain::requires_approval(state.current_phase, next)
        && state.current().status != Status::Approved
}
