//! Error types for coursesync-core

use thiserror::Error;

/// Result type alias using coursesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to read a field out of a server payload.
///
/// Raised for a missing required field or a present field of the wrong
/// shape. Absent optional fields never produce one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field was absent or `null`
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// A present field had an unexpected JSON type
    #[error("field `{field}` is {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A present field had the right type but an unusable value
    #[error("field `{field}` is invalid: {reason}")]
    InvalidValue { field: String, reason: String },

    /// The payload itself was not a JSON object
    #[error("payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Errors that can occur in coursesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Payload decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the LMS API
    #[error("API error: {0}")]
    Api(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Returns the decode error when this failure came from payload decoding.
    pub const fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(error) => Some(error),
            _ => None,
        }
    }
}
