/*!
 * VFS Error Types
 * Structured, type-safe error handling for filesystem operations
 */

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// VFS operation result
pub type VfsResult<T> = Result<T, VfsError>;

/// VFS errors with structured, type-safe error handling
///
/// All error variants include context strings that should be non-empty.
/// Serialization uses tagged enum pattern for type safety.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Name too long: {name} (limit {limit})")]
    NameTooLong { name: String, limit: usize },

    #[error("I/O error: {0}")]
    IoError(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Out of space")]
    OutOfSpace,
}

/// Deserialize and validate non-empty string for error messages
pub(super) fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
