//! Unified error types for the phasegate workflow engine.

use crate::domain::Phase;
use thiserror::Error;

/// Workflow engine and state store errors.
///
/// Every validation error is raised before any mutation is persisted, so a
/// failing call leaves the state document exactly as it was loaded.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No workflow state found for this project")]
    NotInitialized,

    #[error("Project is already initialized")]
    AlreadyInitialized,

    #[error("Workflow state is corrupt: {0}")]
    CorruptState(String),

    #[error("Cannot transition from '{from}' to '{to}'")]
    IllegalTransition { from: Phase, to: Phase },

    #[error("Phase '{0}' must be approved before advancing")]
    ApprovalRequired(Phase),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkflowError {
    /// The command a CLI user can run to recover, if one exists.
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("run `phasegate init <name>` first"),
            Self::AlreadyInitialized => {
                Some("run `phasegate status` to inspect the existing project")
            }
            Self::CorruptState(_) => {
                Some("repair the state file by hand or re-run `phasegate init`")
            }
            Self::IllegalTransition { .. } => {
                Some("run `phasegate status` to see the current phase")
            }
            Self::ApprovalRequired(_) => Some("run `phasegate approve` first"),
            Self::Io(_) | Self::Json(_) => None,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
