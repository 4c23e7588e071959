//! Persisted key-value settings store.
//!
//! Settings live in a small JSON object keyed by name:
//!
//! ```text
//! {
//!   "TIME": { "focus": { "minute": 25, "seconds": 0 },
//!             "break": { "minute": 5,  "seconds": 0 } },
//!   "PROGRESS_IN_TASKBAR": false
//! }
//! ```
//!
//! [`KeyValueStore`] is the raw contract (`get`, `set`, `get_or_set_default`).
//! [`SettingsStore`] is the typed view used by the timer and settings panel;
//! it is cheap to clone and every clone shares the same backing store.

mod error;
mod file;
mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::SessionConfig;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Key holding the [`SessionConfig`].
pub const TIME_KEY: &str = "TIME";

/// Key holding the taskbar progress flag.
pub const PROGRESS_IN_TASKBAR_KEY: &str = "PROGRESS_IN_TASKBAR";

/// Raw key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores a value, replacing any previous one.
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Returns the stored value, or persists and returns `default` if the key
    /// is absent. A stored `null` counts as absent.
    fn get_or_set_default(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        match self.get(key) {
            Some(value) if !value.is_null() => Ok(value),
            _ => {
                debug!(key, "seeding default setting");
                self.set(key, default.clone())?;
                Ok(default)
            }
        }
    }
}

/// Typed helpers over any [`KeyValueStore`].
pub trait StoreExt: KeyValueStore {
    /// Stores a serializable value.
    fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set(key, json)
    }

    /// Returns the typed value, seeding `default` when the key is absent.
    ///
    /// A present value of the wrong shape is replaced by `default`.
    fn get_or_set_default_typed<T>(&self, key: &str, default: T) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let default_json = serde_json::to_value(&default).map_err(|source| {
            StoreError::Serialize {
                key: key.to_string(),
                source,
            }
        })?;

        let value = self.get_or_set_default(key, default_json.clone())?;
        match serde_json::from_value(value) {
            Ok(typed) => Ok(typed),
            Err(e) => {
                warn!(key, error = %e, "stored setting has an unexpected shape, restoring default");
                self.set(key, default_json)?;
                Ok(default)
            }
        }
    }
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {}

// ============================================================================
// SettingsStore
// ============================================================================

/// Typed access to the application's persisted settings.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Wraps an existing key-value store.
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Creates a settings store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Opens the JSON settings file at `path`, creating it on first write.
    pub fn open_file(path: impl Into<std::path::PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(JsonFileStore::open(path)?)))
    }

    /// Writes default values for any setting that is not yet stored.
    pub fn seed_defaults(&self) -> Result<(), StoreError> {
        self.session_config()?;
        self.progress_in_taskbar()?;
        Ok(())
    }

    /// Returns the configured session durations.
    pub fn session_config(&self) -> Result<SessionConfig, StoreError> {
        self.inner
            .get_or_set_default_typed(TIME_KEY, SessionConfig::default())
    }

    /// Persists the session durations.
    pub fn set_session_config(&self, config: &SessionConfig) -> Result<(), StoreError> {
        self.inner.set_typed(TIME_KEY, config)
    }

    /// Returns whether progress is shown on the taskbar.
    pub fn progress_in_taskbar(&self) -> Result<bool, StoreError> {
        self.inner
            .get_or_set_default_typed(PROGRESS_IN_TASKBAR_KEY, false)
    }

    /// Persists the taskbar progress flag.
    pub fn set_progress_in_taskbar(&self, enabled: bool) -> Result<(), StoreError> {
        self.inner.set_typed(PROGRESS_IN_TASKBAR_KEY, &enabled)
    }

    /// Restores every setting to its default.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.set_session_config(&SessionConfig::default())?;
        self.set_progress_in_taskbar(false)
    }

    /// Returns the underlying key-value store.
    pub fn raw(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
