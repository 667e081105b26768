use std::collections::HashMap;

use crate::error::StoreError;
use crate::paths::validate_key;
use crate::store::KeyValueStore;

/// In-process store; contents vanish with the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value.
    pub fn with_value(key: &str, value: impl Into<String>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.write(key, &value.into())?;
        Ok(store)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_of_unwritten_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.read("conversation_history").expect("read"), None);
    }

    #[test]
    fn last_write_wins() {
        let mut store = MemoryStore::new();
        store.write("k", "first").expect("write");
        store.write("k", "second").expect("write");

        assert_eq!(store.read("k").expect("read").as_deref(), Some("second"));
    }

    #[test]
    fn rejects_keys_outside_allowed_alphabet() {
        let mut store = MemoryStore::new();
        let error = store
            .write("../escape", "value")
            .expect_err("path-like key must be rejected");
        assert!(matches!(error, StoreError::InvalidKey { .. }));
    }
}
