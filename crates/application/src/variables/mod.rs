//! Scenario variable storage
//!
//! Each running scenario owns one [`VariableStore`], constructed by the
//! runner and handed to step services (no global, thread-keyed state).
//! [`StoreRegistry`] exists for runners that need to look a scenario's
//! store up by identity while executing scenarios in parallel.

mod registry;
mod store;

pub use registry::{ScenarioId, SharedStore, StoreError, StoreRegistry};
pub use store::VariableStore;
