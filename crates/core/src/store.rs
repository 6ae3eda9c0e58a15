//! Durable snapshot persistence for tracker state.
//!
//! Both trackers keep their whole state in memory and write a full JSON
//! snapshot on every mutation. The write goes to a sibling `.tmp` file
//! first and is then renamed over the canonical path, so a reader never
//! observes a half-written store and a crash mid-flush leaves the previous
//! snapshot intact. A missing or malformed canonical file loads as the
//! default state with a warning; it is never fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to serialize the snapshot.
    #[error("failed to serialize snapshot for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to write or rename the snapshot file.
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Loads a snapshot from `path`, falling back to `T::default()` when the
/// file is absent or unparseable.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Store file {} not found, starting fresh", path.display());
            return T::default();
        }
        Err(e) => {
            warn!(
                "Failed to read store file {}, starting fresh: {}",
                path.display(),
                e
            );
            return T::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(state) => state,
        Err(e) => {
            warn!(
                "Store file {} is malformed, starting fresh: {}",
                path.display(),
                e
            );
            T::default()
        }
    }
}

/// Writes a full snapshot of `state` to `path` via temp-file-then-rename.
pub fn persist<T>(path: &Path, state: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let json = serde_json::to_vec_pretty(state).map_err(|e| StoreError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, &json).map_err(|e| StoreError::Write {
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Persisted snapshot to {}", path.display());
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    type State = BTreeMap<String, Vec<i64>>;

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let state: State = load_or_default(&temp.path().join("missing.json"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_load_malformed_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, b"{not json").unwrap();
        let state: State = load_or_default(&path);
        assert!(state.is_empty());
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        let mut state = State::new();
        state.insert("channel".to_string(), vec![1, 2, 3]);
        persist(&path, &state).unwrap();

        let loaded: State = load_or_default(&path);
        assert_eq!(loaded, state);
        // No temp file left behind after a successful rename.
        assert!(!tmp_sibling(&path).exists());
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/deeper/store.json");
        persist(&path, &State::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_stale_temp_file_does_not_poison_canonical_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        let mut state = State::new();
        state.insert("channel".to_string(), vec![7]);
        persist(&path, &state).unwrap();

        // Simulate a crash between temp write and rename: a half-written
        // temp file next to an intact canonical store.
        fs::write(tmp_sibling(&path), b"{\"partial").unwrap();

        let loaded: State = load_or_default(&path);
        assert_eq!(loaded.get("channel"), Some(&vec![7]));
    }
}
