//! JSON encoding for `Taskboard` data.
//!
//! Tasks, task inputs and filters are exchanged as one JSON object each,
//! with RFC 3339 timestamps and the kind tag under `type`.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Encodes a value as a single-line JSON document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Encodes a value as indented JSON.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Decodes a value from a JSON document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the text is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}
