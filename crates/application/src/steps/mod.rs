//! Step services
//!
//! The pattern-bound step definitions a scenario runner dispatches into.
//! Every service resolves its templated arguments, delegates to one
//! collaborator, and records results back into the scenario's variable
//! store under the conventional keys in [`keys`].

pub mod http;
pub mod variables;

pub use http::HttpSteps;
pub use variables::VariableSteps;

/// Conventional variable-store keys and namespaces.
pub mod keys {
    /// The last response body.
    pub const RESPONSE: &str = "RESPONSE";
    /// The last response status code.
    pub const RESPONSE_STATUS: &str = "RESPONSE_STATUS";
    /// Namespace for response headers (`ResponseHeaders.<name>`).
    pub const RESPONSE_HEADER_PREFIX: &str = "ResponseHeaders.";
    /// Namespace for response cookies (`ResponseCookie.<name>`).
    pub const RESPONSE_COOKIE_PREFIX: &str = "ResponseCookie.";
    /// Namespace for cookies to attach to outgoing requests.
    pub const REQUEST_COOKIE_PREFIX: &str = "RequestCookie.";
}
