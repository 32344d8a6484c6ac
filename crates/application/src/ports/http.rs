//! HTTP client port

use thiserror::Error;

use stepflow_domain::{RequestSpec, ResponseRecord};

/// Errors an HTTP adapter can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpClientError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// Host name resolution failed.
    #[error("could not resolve host '{host}': {message}")]
    Dns {
        /// The host that failed to resolve.
        host: String,
        /// Resolver detail.
        message: String,
    },

    /// The remote host refused the connection.
    #[error("connection refused by '{host}'")]
    ConnectionRefused {
        /// The refusing host.
        host: String,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// The redirect cap.
        max: u32,
    },

    /// The request body was rejected before sending.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// Execution is synchronous: the retry executor's contract is a blocking
/// call-then-assert cycle on the scenario's worker thread.
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the recorded response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] for transport-level failures. Non-2xx
    /// statuses are not errors; verify steps assert on them.
    fn execute(&self, request: &RequestSpec) -> Result<ResponseRecord, HttpClientError>;
}
