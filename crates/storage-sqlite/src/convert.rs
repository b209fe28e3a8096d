//! Conversions between domain values and their stored representations.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::StorageError;

/// Store a snake_case serde enum as its bare string value.
pub(crate) fn enum_to_db<T: Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)
        .map_err(|err| StorageError::Corrupt(err.to_string()))?
        .trim_matches('"')
        .to_string())
}

pub(crate) fn enum_from_db<T: DeserializeOwned>(value: &str) -> Result<T, StorageError> {
    serde_json::from_str(&format!("\"{}\"", value))
        .map_err(|err| StorageError::Corrupt(format!("unrecognized value '{}': {}", value, err)))
}

pub(crate) fn format_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(crate) fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| StorageError::Corrupt(format!("invalid timestamp '{}': {}", value, err)))
}
