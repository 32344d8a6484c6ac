//! Configuration sources.

pub mod properties;

pub use properties::{ConfigError, PropertiesConfig};
