//! Stepflow Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod config;
pub mod verify;

pub use adapters::ReqwestHttpClient;
pub use config::{ConfigError, PropertiesConfig};
pub use verify::AssertionRunner;
