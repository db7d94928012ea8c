//! Configuration management for phasegate.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&PathBuf>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.phasegate.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(".phasegate.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/phasegate/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "phasegate", "phasegate") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (PHASEGATE_*)
        builder = builder.add_source(
            Environment::with_prefix("PHASEGATE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration with default settings only
    pub fn load_defaults() -> Self {
        Self::default()
    }
}

/// Workflow state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Directory holding workflow state (relative to project root)
    #[serde(default = "default_state_directory")]
    pub state_directory: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            state_directory: default_state_directory(),
        }
    }
}

fn default_state_directory() -> String {
    crate::store::DEFAULT_STATE_DIR.to_string()
}

/// Agent and approver defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Label recorded as `agent_used` on transitions
    #[serde(default = "default_agent_name")]
    pub name: String,
    /// Approver recorded when `--by` is not given
    #[serde(default = "default_approver")]
    pub default_approver: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            default_approver: default_approver(),
        }
    }
}

fn default_agent_name() -> String {
    "scaffold".to_string()
}

fn default_approver() -> String {
    whoami_fallback()
}

fn whoami_fallback() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
