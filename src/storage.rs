// SPDX-License-Identifier: GPL-3.0-only

//! Persistence of the last used device
//!
//! The controller treats the store as best-effort: read failures fall back to
//! "no preference" and write failures are logged and otherwise ignored.

use crate::constants::storage::{APP_DIR, LAST_DEVICE_KEY, STATE_FILE};
use crate::errors::{CameraError, CameraResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the last used device id lives
pub trait DeviceStore: Send + Sync {
    fn last_device_id(&self) -> CameraResult<Option<String>>;

    fn set_last_device_id(&self, id: &str) -> CameraResult<()>;
}

/// Key/value JSON file, one string per key
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user data directory
    pub fn in_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR).join(STATE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> CameraResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl DeviceStore for JsonFileStore {
    fn last_device_id(&self) -> CameraResult<Option<String>> {
        Ok(self.read()?.remove(LAST_DEVICE_KEY))
    }

    fn set_last_device_id(&self, id: &str) -> CameraResult<()> {
        let mut values = self.read().unwrap_or_default();
        values.insert(LAST_DEVICE_KEY.to_string(), id.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        debug!(path = %self.path.display(), device = id, "Last device saved");
        Ok(())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    last: Mutex<Option<String>>,
    fail: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last(id: impl Into<String>) -> Self {
        Self {
            last: Mutex::new(Some(id.into())),
            fail: Mutex::new(false),
        }
    }

    /// Make every read and write fail
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    fn check(&self) -> CameraResult<()> {
        if *self.fail.lock() {
            return Err(CameraError::Config("storage unavailable".into()));
        }
        Ok(())
    }
}

impl DeviceStore for MemoryStore {
    fn last_device_id(&self) -> CameraResult<Option<String>> {
        self.check()?;
        Ok(self.last.lock().clone())
    }

    fn set_last_device_id(&self, id: &str) -> CameraResult<()> {
        self.check()?;
        *self.last.lock() = Some(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_failing() {
        let store = MemoryStore::with_last("a");
        assert_eq!(store.last_device_id(), Ok(Some("a".to_string())));
        store.set_failing(true);
        assert!(store.last_device_id().is_err());
        assert!(store.set_last_device_id("b").is_err());
        store.set_failing(false);
        assert_eq!(store.last_device_id(), Ok(Some("a".to_string())));
    }
}
