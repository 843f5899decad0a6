//! # Core Data Models for the Registry
//!
//! Defines the registry entry, the normalization of mirror payloads into
//! entries, and the error type shared by the crate.
//!
//! ## Mirror Payload Shapes
//!
//! Mirrors return a JSON array. Each item carries a display name and one of
//! two id fields:
//!
//! | Shape | Id field | Example |
//! |-------|----------|---------|
//! | vtbs.moe `short` | `uid` | `{"uid": 672328094, "uname": "..."}` |
//! | persisted / legacy | `mid` | `{"mid": 672328094, "uname": "..."}` |
//!
//! Ids may arrive as JSON numbers or numeric strings. Items with a zero or
//! missing id, or an empty name, are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A known account in the registry.
///
/// Serialized with the field names of the persisted file (`mid`, `uname`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Numeric account id. The join key against follow-lists.
    pub mid: u64,

    /// Display name at the time the mirror was read.
    pub uname: String,
}

impl RegistryEntry {
    /// Creates an entry.
    pub fn new(mid: u64, uname: impl Into<String>) -> Self {
        Self {
            mid,
            uname: uname.into(),
        }
    }
}

/// Normalizes one mirror item into an entry.
///
/// `uid` is preferred over `mid` when both are present.
pub fn normalize_item(item: &Value) -> Option<RegistryEntry> {
    let uname = item.get("uname")?.as_str()?;
    if uname.is_empty() {
        return None;
    }

    let mid = ["uid", "mid"]
        .iter()
        .filter_map(|field| item.get(*field).and_then(parse_id))
        .next()?;

    Some(RegistryEntry::new(mid, uname))
}

/// Normalizes a whole mirror response.
///
/// # Errors
///
/// Returns [`RegistryError::UnexpectedShape`] if the payload is not an array.
pub fn normalize_payload(payload: &Value) -> Result<Vec<RegistryEntry>> {
    let items = payload.as_array().ok_or_else(|| {
        RegistryError::UnexpectedShape(format!("expected an array, got {}", kind_of(payload)))
    })?;

    Ok(items.iter().filter_map(normalize_item).collect())
}

/// Reads an id from a number or a numeric string. Zero counts as absent.
fn parse_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading or writing the persisted file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A mirror request failed.
    #[error("Mirror {url} failed: {reason}")]
    Mirror {
        /// The mirror that failed.
        url: String,
        /// Transport or status description.
        reason: String,
    },

    /// A mirror did not answer within its timeout.
    #[error("Mirror {0} timed out")]
    Timeout(String),

    /// A mirror answered with something other than an entry list.
    #[error("Unexpected mirror payload: {0}")]
    UnexpectedShape(String),

    /// Every mirror failed; the previous registry was kept.
    #[error("All {0} registry mirrors failed")]
    Unavailable(usize),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
