//! Error types for changeset operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for changeset operations.
pub type ChangesetResult<T> = Result<T, ChangesetError>;

/// Errors that can occur during changeset operations.
///
/// Validation failures are not errors: they are recorded in the errors map
/// and surfaced through `is_valid` and the error accessors.
#[derive(Debug, Error)]
pub enum ChangesetError {
    /// Content passed at construction is not a plain object.
    #[error("content must be a plain object, found {found}")]
    InvalidContent {
        /// The actual type of the rejected content.
        found: &'static str,
    },

    /// Array index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path to the array.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the array.
        len: usize,
    },

    /// Type mismatch when writing a value.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        found: &'static str,
    },
}

impl ChangesetError {
    /// Create an invalid content error.
    #[inline]
    pub fn invalid_content(found: &'static str) -> Self {
        ChangesetError::InvalidContent { found }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        ChangesetError::IndexOutOfBounds { path, index, len }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: &'static str, found: &'static str) -> Self {
        ChangesetError::TypeMismatch {
            path,
            expected,
            found,
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
