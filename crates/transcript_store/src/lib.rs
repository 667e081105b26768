//! Persisted key-value storage for the flat conversation transcript.
//!
//! One string value per key, durable across process restarts, last write wins.

mod error;
mod file;
mod memory;
mod paths;
mod schema;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use paths::{record_file_name, store_root, validate_key};
pub use schema::{StoredValue, ValueRecordType};
pub use store::{KeyValueStore, CONVERSATION_HISTORY_KEY};
