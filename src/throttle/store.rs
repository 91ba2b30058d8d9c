//! Storage port for throttle state.
//!
//! A narrow `load`/`save`/`clear` port over one opaque blob per client,
//! with a file-backed implementation (one JSON file per fingerprint) and
//! an in-memory one for tests.

use super::ThrottleState;
use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::warn;

pub trait ThrottleStore: Send + Sync {
    /// Load the blob for `key`, or `None` when the client has no history.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<ThrottleState>>;

    /// # Errors
    /// Returns an error when the blob cannot be written.
    fn save(&self, key: &str, state: ThrottleState) -> Result<()>;

    /// # Errors
    /// Returns an error when the blob cannot be removed.
    fn clear(&self, key: &str) -> Result<()>;

    /// Keys currently holding state, for the expiry sweeper.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be enumerated.
    fn keys(&self) -> Result<Vec<String>>;
}

/// One JSON file per fingerprint under a state directory.
///
/// Writes are synchronous: the blob is on disk before the caller proceeds,
/// matching the submit-handler flow where every transition persists before
/// the next network step.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// # Errors
    /// Returns an error when the state directory cannot be created.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ThrottleStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<ThrottleState>> {
        let path = self.path(key);
        let blob = match fs::read_to_string(&path) {
            Ok(blob) => blob,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read throttle blob: {}", path.display()))
            }
        };

        match serde_json::from_str(&blob) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                // A corrupt blob counts as no history, same as the page
                // treating an unparseable local-storage value as zero.
                warn!("Discarding corrupt throttle blob {}: {err}", path.display());
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, state: ThrottleState) -> Result<()> {
        let path = self.path(key);
        let blob = serde_json::to_vec(&state).context("Failed to encode throttle state")?;
        fs::write(&path, blob)
            .with_context(|| format!("Failed to write throttle blob: {}", path.display()))
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove throttle blob: {}", path.display())),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list state directory: {}", self.dir.display()))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}

/// In-process store for tests and single-shot tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, ThrottleState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThrottleStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<ThrottleState>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).copied())
    }

    fn save(&self, key: &str, state: ThrottleState) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), state);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.load("abc")?, None);

        let state = ThrottleState {
            attempts: 2,
            last_attempt: Some(42),
            ..ThrottleState::default()
        };
        store.save("abc", state)?;
        assert_eq!(store.load("abc")?, Some(state));
        assert_eq!(store.keys()?, vec!["abc".to_string()]);

        store.clear("abc")?;
        assert_eq!(store.load("abc")?, None);
        Ok(())
    }

    #[test]
    fn file_store_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path())?;

        assert_eq!(store.load("deadbeef")?, None);

        let state = ThrottleState {
            attempts: 4,
            lockout_level: 1,
            lockout_until: Some(1_700_000_000_000),
            last_attempt: Some(1_699_999_999_000),
        };
        store.save("deadbeef", state)?;
        assert_eq!(store.load("deadbeef")?, Some(state));
        assert_eq!(store.keys()?, vec!["deadbeef".to_string()]);

        store.clear("deadbeef")?;
        assert_eq!(store.load("deadbeef")?, None);

        // Clearing an absent key is a no-op, not an error.
        store.clear("deadbeef")?;
        Ok(())
    }

    #[test]
    fn file_store_treats_corrupt_blob_as_fresh() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path())?;

        fs::write(dir.path().join("cafe.json"), b"not json")?;
        assert_eq!(store.load("cafe")?, None);
        Ok(())
    }
}
