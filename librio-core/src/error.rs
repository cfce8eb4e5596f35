//! Error types for Librio Core

use crate::types::DraftField;
use thiserror::Error;

/// Result type alias using LibrioError
pub type Result<T> = std::result::Result<T, LibrioError>;

/// Top-level error type for all Librio operations
#[derive(Debug, Error)]
pub enum LibrioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bad input to publish/update or to a preference setter.
///
/// Returned straight to the caller; never written to the store's error slot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid fields: {}", format_fields(.0))]
    InvalidFields(Vec<DraftField>),

    #[error("Unknown preference: {0}")]
    UnknownPreference(String),

    #[error("Invalid value for preference {key}: {value}")]
    InvalidPreferenceValue { key: String, value: String },
}

impl ValidationError {
    /// Fields rejected by draft/patch validation, empty for preference errors
    pub fn fields(&self) -> &[DraftField] {
        match self {
            Self::InvalidFields(fields) => fields,
            _ => &[],
        }
    }
}

fn format_fields(fields: &[DraftField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Storage unavailable")]
    Unavailable,

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Failures of the simulated network round trip
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unreachable")]
    Unreachable,

    #[error("Backend request failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_fields() {
        let err = ValidationError::InvalidFields(vec![DraftField::Title, DraftField::Price]);
        assert_eq!(err.to_string(), "Invalid fields: title, price");
        assert_eq!(err.fields(), &[DraftField::Title, DraftField::Price]);
    }
}
