//! Step-level error types

use thiserror::Error;

use stepflow_domain::DomainError;

use crate::ports::HttpClientError;

/// Errors surfaced by step services to the scenario runner.
///
/// `Assertion` and `MissingVariable` are the test-failure kinds; the rest
/// wrap collaborator failures unchanged so the runner's report shows the
/// real cause.
#[derive(Debug, Error)]
pub enum StepError {
    /// A step required a variable that is not in the store.
    #[error("required variable '{0}' is not set")]
    MissingVariable(String),

    /// A step assertion did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A domain validation or parse error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The HTTP collaborator failed.
    #[error(transparent)]
    Http(#[from] HttpClientError),
}

/// Result type alias for step operations.
pub type StepResult<T> = Result<T, StepError>;
