//! JSON-file backed key-value store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::StoreError;
use super::KeyValueStore;

/// Directory under the user config dir holding the settings file.
pub const APP_DIR_NAME: &str = "atomic-pomodoro";

/// Settings file name.
pub const SETTINGS_FILE_NAME: &str = "window-state-main.json";

/// Key-value store persisted as a single JSON object on disk.
///
/// The whole object is kept in memory; every `set` rewrites the file through
/// a temporary sibling and a rename so a crash never leaves a torn file.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Returns `<config dir>/atomic-pomodoro/window-state-main.json`.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Opens the store at `path`.
    ///
    /// A missing or empty file yields an empty store. A file that is not a
    /// JSON object is logged and treated as empty; it is overwritten on the
    /// next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match load(&path) {
            Ok(data) => data,
            Err(e @ StoreError::Parse { .. }) => {
                warn!(error = %e, "ignoring unreadable settings");
                Map::new()
            }
            Err(e) => return Err(e),
        };

        debug!(path = %path.display(), keys = data.len(), "settings store opened");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn persist(&self, data: &Map<String, Value>) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(data).map_err(|source| StoreError::Serialize {
            key: "*".to_string(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

fn load(path: &Path) -> Result<Map<String, Value>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = data.insert(key.to_string(), value);

        if let Err(e) = self.persist(&data) {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(old) => data.insert(key.to_string(), old),
                None => data.remove(key),
            };
            return Err(e);
        }

        debug!(key, "setting persisted");
        Ok(())
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        (dir, path)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, path) = temp_store_path();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("TIME"), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_set_creates_file_and_survives_reopen() {
        let (_dir, path) = temp_store_path();
        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("PROGRESS_IN_TASKBAR", json!(true)).unwrap();
        }
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("PROGRESS_IN_TASKBAR"), Some(json!(true)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (_dir, path) = temp_store_path();
        let store = JsonFileStore::open(&path).unwrap();
        store.set("TIME", json!({"focus": {"minute": 1, "seconds": 0}})).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let (_dir, path) = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("TIME"), None);

        store.set("TIME", json!(1)).unwrap();
        let contents: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(contents, json!({"TIME": 1}));
    }

    #[test]
    fn test_empty_file_is_empty() {
        let (_dir, path) = temp_store_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "  \n").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("TIME"), None);
    }

    #[test]
    fn test_default_path_file_name() {
        if let Ok(path) = JsonFileStore::default_path() {
            assert!(path.ends_with(Path::new(APP_DIR_NAME).join(SETTINGS_FILE_NAME)));
        }
    }
}
