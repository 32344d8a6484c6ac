//! Ports - traits the infrastructure adapters implement
//!
//! The step services depend on these abstractions only; concrete
//! implementations (properties files, reqwest) live in the
//! infrastructure crate.

pub mod config;
pub mod http;

pub use config::{ConfigSource, MapConfig};
pub use http::{HttpClient, HttpClientError};
