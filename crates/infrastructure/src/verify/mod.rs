//! Response verification.

pub mod runner;

pub use runner::AssertionRunner;
