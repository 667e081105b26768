use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRecordType {
    Value,
}

/// On-disk record holding one stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredValue {
    #[serde(rename = "type")]
    pub record_type: ValueRecordType,
    pub version: u32,
    pub key: String,
    pub updated_at: String,
    pub value: String,
}

impl StoredValue {
    #[must_use]
    pub fn v1(
        key: impl Into<String>,
        updated_at: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            record_type: ValueRecordType::Value,
            version: 1,
            key: key.into(),
            updated_at: updated_at.into(),
            value: value.into(),
        }
    }
}
