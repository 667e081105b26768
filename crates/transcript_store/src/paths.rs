use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const STORE_DIR: [&str; 2] = [".sage_chat", "store"];

#[must_use]
pub fn store_root(base: &Path) -> PathBuf {
    base.join(STORE_DIR[0]).join(STORE_DIR[1])
}

/// Keys map directly to file names, so only a conservative alphabet is allowed.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

#[must_use]
pub fn record_file_name(key: &str) -> String {
    format!("{key}.json")
}
