//! Durable persistence of one state document per project root.

use crate::domain::ProjectState;
use crate::error::{Result, WorkflowError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the project root that holds workflow state.
pub const DEFAULT_STATE_DIR: &str = ".phasegate";

const STATE_FILE: &str = "state.json";

/// Loads and persists the state document for a single project root.
///
/// The root path is injected so tests and multi-project callers run against
/// isolated directories; there is no process-wide state.
pub struct StateStore {
    root: PathBuf,
    state_dir: String,
}

impl StateStore {
    /// Create a store for the given project root with the default state
    /// directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_state_dir(root, DEFAULT_STATE_DIR)
    }

    /// Create a store with a configured state directory name.
    pub fn with_state_dir(root: impl Into<PathBuf>, state_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            state_dir: state_dir.into(),
        }
    }

    /// The project root this store reads and writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the state document.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.state_dir).join(STATE_FILE)
    }

    /// Whether a state document exists for this root.
    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Seed and persist a fresh project document.
    ///
    /// Fails with `AlreadyInitialized` when a document is already present
    /// rather than silently overwriting an existing project.
    pub fn initialize(&self, project_name: &str) -> Result<ProjectState> {
        if self.exists() {
            return Err(WorkflowError::AlreadyInitialized);
        }
        let state = ProjectState::new(project_name);
        self.save(&state)?;
        tracing::info!(project = %state.project_id, "initialized workflow state");
        Ok(state)
    }

    /// Load the state document.
    pub fn load(&self) -> Result<ProjectState> {
        let path = self.state_path();
        if !path.exists() {
            return Err(WorkflowError::NotInitialized);
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| WorkflowError::CorruptState(e.to_string()))
    }

    /// Serialize the whole document and replace the file in one step.
    ///
    /// Writes to a sibling temp file and renames over the target so a reader
    /// never observes a partially written document.
    pub fn save(&self, state: &ProjectState) -> Result<()> {
        let path = self.state_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "saved workflow state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phase, Status};
    use tempfile::TempDir;

    #[test]
    fn test_initialize_seeds_document() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());

        let state = store.initialize("Demo").unwrap();
        assert_eq!(state.project_id, "demo");
        assert_eq!(state.current_phase, Phase::Init);
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.phases.init.status, Status::Approved);
        assert_eq!(loaded.phases.specify.status, Status::Pending);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());

        store.initialize("Demo").unwrap();
        let err = store.initialize("Demo Again").unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyInitialized));

        // The original document is untouched
        let loaded = store.load().unwrap();
        assert_eq!(loaded.project_name, "Demo");
    }

    #[test]
    fn test_load_without_init_fails() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());
        assert!(matches!(
            store.load().unwrap_err(),
            WorkflowError::NotInitialized
        ));
    }

    #[test]
    fn test_load_corrupt_document_fails() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());
        fs::create_dir_all(store.state_path().parent().unwrap()).unwrap();
        fs::write(store.state_path(), "{ not json").unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            WorkflowError::CorruptState(_)
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());

        let mut state = store.initialize("Demo").unwrap();
        state
            .metadata
            .insert("branch".to_string(), "001-demo".to_string());
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_custom_state_dir() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::with_state_dir(temp.path(), ".workflow");
        store.initialize("Demo").unwrap();
        assert!(temp.path().join(".workflow").join("state.json").exists());
    }
}
