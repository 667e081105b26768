use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::paths::{record_file_name, validate_key};
use crate::schema::StoredValue;
use crate::store::KeyValueStore;

/// Durable store keeping one JSON record file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(record_file_name(key))
    }

    /// Loads and validates the full record for `key`.
    pub fn load_record(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
        validate_key(key)?;
        let path = self.record_path(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::io("reading stored record", &path, source)),
        };

        let record = serde_json::from_str::<StoredValue>(&raw)
            .map_err(|source| StoreError::json_parse(&path, source))?;
        validate_record(&path, key, &record)?;

        Ok(Some(record))
    }

    fn write_record(&self, key: &str, record: &StoredValue) -> Result<(), StoreError> {
        let path = self.record_path(key);
        fs::create_dir_all(&self.root)
            .map_err(|source| StoreError::io("creating store directory", &self.root, source))?;

        let mut serialized = serde_json::to_string(record)
            .map_err(|source| StoreError::json_serialize(&path, source))?;
        serialized.push('\n');

        let temp_path = self
            .root
            .join(format!(".{}.{}.tmp", record_file_name(key), uuid::Uuid::new_v4()));
        if let Err(error) = write_synced(&temp_path, serialized.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(error);
        }

        fs::rename(&temp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StoreError::io("replacing stored record", &path, source)
        })
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load_record(key)?.map(|record| record.value))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let record = StoredValue::v1(key, now_rfc3339()?, value);
        self.write_record(key, &record)?;

        tracing::debug!(
            key,
            bytes = value.len(),
            path = %self.record_path(key).display(),
            "stored value written"
        );
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file: File = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| StoreError::io("creating temporary record", path, source))?;
    file.write_all(bytes)
        .map_err(|source| StoreError::io("writing temporary record", path, source))?;
    file.sync_all()
        .map_err(|source| StoreError::io("syncing temporary record", path, source))
}

pub(crate) fn validate_record(
    path: &Path,
    key: &str,
    record: &StoredValue,
) -> Result<(), StoreError> {
    if record.version != 1 {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: record.version,
        });
    }

    if record.key != key {
        return Err(StoreError::KeyMismatch {
            path: path.to_path_buf(),
            expected: key.to_string(),
            found: record.key.clone(),
        });
    }

    if OffsetDateTime::parse(&record.updated_at, &Rfc3339).is_err() {
        return Err(StoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            field: "updated_at",
            value: record.updated_at.clone(),
        });
    }

    Ok(())
}

fn now_rfc3339() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(StoreError::ClockFormat)
}
