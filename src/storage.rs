//! Key-value storage collaborator interface.
//!
//! The persistence engine is out of scope; the core sees get/put/
//! query-by-prefix semantics only. [`MemoryStorage`] backs tests and
//! single-shot CLI runs.

use crate::error::{AtlasError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Key-value store with prefix scans.
pub trait Storage: Send + Sync {
    /// Read one value.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write one value.
    fn put(&self, key: &str, value: Value) -> Result<()>;

    /// All values whose key starts with `prefix`, in key order.
    fn query_by_prefix(&self, prefix: &str) -> Result<Vec<Value>>;
}

/// In-memory storage backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AtlasError::storage(key, e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AtlasError::storage(key, e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn query_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AtlasError::storage(prefix, e.to_string()))?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_round_trip() {
        let storage = MemoryStorage::new();
        storage.put("snapshot/1", json!({"n": 1})).unwrap();
        assert_eq!(storage.get("snapshot/1").unwrap(), Some(json!({"n": 1})));
        assert_eq!(storage.get("snapshot/2").unwrap(), None);
    }

    #[test]
    fn test_query_by_prefix_ordered() {
        let storage = MemoryStorage::new();
        storage.put("snapshot/2", json!(2)).unwrap();
        storage.put("snapshot/1", json!(1)).unwrap();
        storage.put("other/9", json!(9)).unwrap();

        let values = storage.query_by_prefix("snapshot/").unwrap();
        assert_eq!(values, vec![json!(1), json!(2)]);
    }
}
