//! Stepflow Domain - Core types for the scenario-step library
//!
//! This crate defines the domain model shared by the step services and
//! their adapters. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod key;
pub mod request;
pub mod response;
pub mod value;
pub mod verify;

pub use error::{DomainError, DomainResult};
pub use key::{KeyPattern, PatternSegment};
pub use request::{Header, HttpMethod, RequestSpec};
pub use response::{Cookie, ResponseRecord};
pub use value::Value;
pub use verify::{Assertion, AssertionResult, StatusExpectation};
