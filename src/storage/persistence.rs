//! Durable snapshot of the cached wake-cycle state.

use crate::core::{Result, StoreError};
use crate::state::CachedState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const STATE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub saved_at: i64,
    pub state: CachedState,
}

impl StateSnapshot {
    pub fn new(state: CachedState) -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
            saved_at: Utc::now().timestamp_millis(),
            state,
        }
    }
}

// ============================================================================
// State File
// ============================================================================

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the state to a sibling temp file and renames it into place.
    pub fn save(&self, state: &CachedState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::State(format!("Failed to create state directory: {}", e))
            })?;
        }
        let temp_path = self.path.with_extension("tmp");
        let temp_file = File::create(&temp_path)
            .map_err(|e| StoreError::State(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(temp_file);
        let serialized = rmp_serde::to_vec(&StateSnapshot::new(state.clone()))
            .map_err(|e| StoreError::State(format!("Failed to serialize state: {}", e)))?;
        writer
            .write_all(&serialized)
            .map_err(|e| StoreError::State(format!("Failed to write state: {}", e)))?;
        writer
            .flush()
            .map_err(|e| StoreError::State(format!("Failed to flush state: {}", e)))?;
        writer
            .get_mut()
            .sync_all()
            .map_err(|e| StoreError::State(format!("Failed to sync state: {}", e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::State(format!("Failed to rename state file: {}", e)))?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<StateSnapshot>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::State(format!("Failed to open state: {}", e))),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| StoreError::State(format!("Failed to read state: {}", e)))?;
        let snapshot: StateSnapshot = rmp_serde::from_slice(&data)
            .map_err(|e| StoreError::State(format!("Failed to deserialize state: {}", e)))?;
        if snapshot.version != STATE_FORMAT_VERSION {
            return Err(StoreError::State(format!(
                "Unsupported state version {}",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }

    /// Loads the saved state, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(&self) -> CachedState {
        match self.load() {
            Ok(Some(snapshot)) => snapshot.state,
            Ok(None) => CachedState::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding unreadable state");
                CachedState::default()
            }
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let state_file = StateFile::new(temp_dir.path().join("state.bin"));
        let mut state = CachedState::default();
        state.net_worth = 125_000;
        state.initialized = true;
        state.percent_change = 1.5;
        state.accept_gold_price("$2,400");

        state_file.save(&state).unwrap();
        assert!(state_file.exists());
        assert!(!temp_dir.path().join("state.tmp").exists());

        let loaded = state_file.load().unwrap().unwrap();
        assert_eq!(loaded.version, STATE_FORMAT_VERSION);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_missing_state_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let state_file = StateFile::new(temp_dir.path().join("missing.bin"));
        assert!(state_file.load().unwrap().is_none());
        assert_eq!(state_file.load_or_default(), CachedState::default());
    }

    #[test]
    fn test_corrupt_state_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.bin");
        fs::write(&path, b"not msgpack at all").unwrap();
        let state_file = StateFile::new(&path);
        assert!(matches!(state_file.load(), Err(StoreError::State(_))));
        assert_eq!(state_file.load_or_default(), CachedState::default());
    }
}
