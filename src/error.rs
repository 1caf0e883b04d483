//! Error types for parsing, building and size queries

use thiserror::Error;

/// Result type for all descriptor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by descriptors during parse, build or size queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Stream too short, or a read/write length mismatch
    #[error("field error: expected {expected} bytes, found {actual}")]
    FieldSize { expected: usize, actual: usize },

    /// A size query failed; wraps the underlying cause
    #[error("size query failed")]
    Sizeof {
        #[source]
        source: Box<Error>,
    },

    /// Invalid construction argument or value outside a field's domain
    #[error("invalid argument: {reason}")]
    Value { reason: String },

    /// Bit-integer conversion rejected the value
    #[error("bit integer error: {reason}")]
    BitInteger { reason: String },

    /// Value not present in a mapping and no default was given
    #[error("no mapping for {value}")]
    Mapping { value: String },

    /// Parsed or supplied value does not match an expected constant
    #[error("const mismatch: expected {expected}, found {actual}")]
    Const { expected: String, actual: String },

    /// Strict padding did not match the pattern
    #[error("padding mismatch: {reason}")]
    Padding { reason: String },

    /// A validator rejected the value
    #[error("validation failed for {value}")]
    Validation { value: String },

    /// A descriptor received a value of the wrong kind
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl Error {
    /// Shorthand for an invalid-argument error
    pub(crate) fn value(reason: impl Into<String>) -> Self {
        Error::Value {
            reason: reason.into(),
        }
    }
}
