use crate::error::StoreError;

/// Fixed key holding the whole flat conversation transcript.
pub const CONVERSATION_HISTORY_KEY: &str = "conversation_history";

/// Scoped persistence for single string values.
pub trait KeyValueStore: Send {
    /// Returns the stored value, or `None` when nothing was ever written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the stored value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}
