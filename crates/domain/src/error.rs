//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stored string value could not be parsed as the requested type.
    #[error("cannot parse '{value}' as {expected}")]
    Parse {
        /// The type the caller asked for.
        expected: &'static str,
        /// The raw stored value.
        value: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name is empty or contains forbidden characters.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
}

impl DomainError {
    /// Creates a parse error for the given target type and raw value.
    #[must_use]
    pub fn parse(expected: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            expected,
            value: value.into(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
