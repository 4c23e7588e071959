//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use super::error::StoreError;
use super::KeyValueStore;

/// A store that forgets everything when dropped. Used by tests and by the
/// `--ephemeral` run mode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", json!(1)).unwrap();
        assert_eq!(store.get("a"), Some(json!(1)));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("a", json!(1)).unwrap();
        store.set("a", json!(2)).unwrap();
        assert_eq!(store.get("a"), Some(json!(2)));
    }
}
