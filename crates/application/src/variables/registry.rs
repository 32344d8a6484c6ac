//! Store registry for parallel scenario execution
//!
//! Runners that execute scenarios on worker threads register one store per
//! scenario here and look it up by identity. Reading a store that was never
//! registered is a wiring error and fails fast, rather than looking like an
//! ordinary variable miss.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use super::store::VariableStore;

/// Identity of one running scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a scenario id from the runner-supplied identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A variable store shared between the step services of one scenario.
pub type SharedStore = Arc<Mutex<VariableStore>>;

/// Registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store was read before the runner registered it.
    #[error("variable store not initialized for scenario '{0}'")]
    NotInitialized(ScenarioId),
}

/// Mutex-guarded map from scenario identity to its store.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    inner: Mutex<HashMap<ScenarioId, SharedStore>>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh, empty store for the scenario, replacing any
    /// previous registration. Returns the shared handle.
    pub fn register(&self, id: ScenarioId) -> SharedStore {
        let store: SharedStore = Arc::new(Mutex::new(VariableStore::new()));
        self.lock().insert(id, Arc::clone(&store));
        store
    }

    /// Looks up the store for a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] when the scenario was never
    /// registered (or was already removed).
    pub fn get(&self, id: &ScenarioId) -> Result<SharedStore, StoreError> {
        self.lock()
            .get(id)
            .map(Arc::clone)
            .ok_or_else(|| StoreError::NotInitialized(id.clone()))
    }

    /// Removes a scenario's store at scenario teardown.
    pub fn remove(&self, id: &ScenarioId) -> Option<SharedStore> {
        self.lock().remove(id)
    }

    /// Number of registered scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no scenario is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ScenarioId, SharedStore>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
