//! Stepflow Application - scenario-step core
//!
//! The pieces every step service shares:
//!
//! - [`variables`]: the per-scenario variable store with fuzzy key lookup,
//!   plus a registry for runners executing scenarios in parallel.
//! - [`template`]: `${name}` placeholder resolution against the store and a
//!   configuration source, with built-in dynamic placeholders.
//! - [`retry`]: the bounded fixed-delay retry executor that verify steps
//!   wrap around a call-plus-assert cycle.
//! - [`ports`]: traits the infrastructure adapters implement.
//! - [`steps`]: the step services themselves (HTTP, variables).

pub mod error;
pub mod ports;
pub mod retry;
pub mod steps;
pub mod template;
pub mod variables;

pub use error::{StepError, StepResult};
pub use retry::{CancellationToken, RetryError, RetryPolicy};
pub use template::{ResolveOptions, TemplateResolver};
pub use variables::{ScenarioId, SharedStore, StoreError, StoreRegistry, VariableStore};
