//! Session state persistence
//!
//! The whole session lives in one JSON document, replaced in full on every
//! save; there is no partial update and no cross-process locking, so
//! concurrent writers race with last-writer-wins semantics. The store is a
//! trait so the orchestrator can be exercised against an in-memory
//! implementation in tests and embedded without touching the filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::Result;
use crate::plan::SessionState;

/// Storage backend for the current session state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the previously saved state.
    ///
    /// An absent or unreadable backing document loads as the empty state;
    /// corruption favors availability over detecting data loss.
    async fn load(&self) -> Result<SessionState>;

    /// Serialize and persist the full state, replacing any previous content.
    async fn save(&self, state: &SessionState) -> Result<()>;
}

/// File-backed store: one pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<SessionState> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "State file is not valid JSON, resetting to empty state"
                );
                Ok(SessionState::default())
            }
        }
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| crate::Error::StateError(format!("failed to serialize state: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

/// In-memory store for tests and embedders
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: RwLock<SessionState>,
}

impl MemoryStateStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with the given state
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<SessionState> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.write().await = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Phase, Plan};

    fn sample_state() -> SessionState {
        SessionState {
            idea: Some("Build a recipe sharing app".to_string()),
            plan: Some(Plan {
                total_phases: 1,
                phases: vec![Phase {
                    phase: 1,
                    tasks: vec!["scaffold project".to_string()],
                    commit_message: "feat: complete phase 1".to_string(),
                }],
            }),
            current_phase: Some(1),
        }
    }

    #[test]
    fn test_file_store_reports_backing_path() {
        let store = FileStateStore::new("sessions/state.json");
        assert_eq!(store.path(), Path::new("sessions/state.json"));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));

        let state = sample_state();
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_file_store_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nope.json"));

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, SessionState::default());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{not json at all").await.unwrap();

        let store = FileStateStore::new(&path);
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, SessionState::default());
    }

    #[tokio::test]
    async fn test_file_store_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state()).await.unwrap();
        store.save(&SessionState::default()).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, SessionState::default());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load().await.unwrap(), SessionState::default());

        let state = sample_state();
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);
    }
}
