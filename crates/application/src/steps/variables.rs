//! Variable step service
//!
//! Steps that manipulate the scenario's variable store directly: seed a
//! value, copy a configuration entry in, or assert on what an earlier step
//! recorded.

use std::sync::{Arc, MutexGuard, PoisonError};

use crate::error::{StepError, StepResult};
use crate::ports::ConfigSource;
use crate::template::TemplateResolver;
use crate::variables::{SharedStore, VariableStore};

/// Step service for variable bookkeeping steps.
pub struct VariableSteps {
    config: Arc<dyn ConfigSource>,
    store: SharedStore,
}

impl VariableSteps {
    /// Creates the service for one scenario.
    pub fn new(config: Arc<dyn ConfigSource>, store: SharedStore) -> Self {
        Self { config, store }
    }

    /// Stores a variable. The value is resolved first, so steps can derive
    /// values from earlier ones (`set("auth", "Bearer ${token}")`).
    pub fn set(&self, name: &str, value: &str) {
        let mut store = self.lock_store();
        let resolved = {
            let mut resolver = TemplateResolver::new(&store, self.config.as_ref());
            resolver.resolve(value)
        };
        store.set(name, resolved);
    }

    /// Copies a configuration entry into the store.
    ///
    /// # Errors
    ///
    /// [`StepError::MissingVariable`] when the configuration has no such
    /// key.
    pub fn set_from_config(&self, name: &str, config_key: &str) -> StepResult<()> {
        let value = self
            .config
            .get(config_key)
            .ok_or_else(|| StepError::MissingVariable(config_key.to_string()))?;
        self.lock_store().set(name, value);
        Ok(())
    }

    /// Reads a variable, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock_store().get(name).map(str::to_string)
    }

    /// Asserts that a variable equals an expected (templated) value.
    ///
    /// # Errors
    ///
    /// [`StepError::MissingVariable`] when the variable is not set,
    /// [`StepError::Assertion`] on a mismatch.
    pub fn assert_equals(&self, name: &str, expected: &str) -> StepResult<()> {
        let store = self.lock_store();
        let expected = {
            let mut resolver = TemplateResolver::new(&store, self.config.as_ref());
            resolver.resolve(expected)
        };
        let actual = store
            .get(name)
            .ok_or_else(|| StepError::MissingVariable(name.to_string()))?;

        if actual == expected {
            Ok(())
        } else {
            Err(StepError::Assertion(format!(
                "variable '{name}': expected '{expected}', got '{actual}'"
            )))
        }
    }

    /// Asserts that a variable exists (exact key).
    ///
    /// # Errors
    ///
    /// [`StepError::MissingVariable`] when it does not.
    pub fn assert_exists(&self, name: &str) -> StepResult<()> {
        if self.lock_store().has(name) {
            Ok(())
        } else {
            Err(StepError::MissingVariable(name.to_string()))
        }
    }

    /// Wholesale clear, typically called at scenario boundaries.
    pub fn clear_all(&self) {
        self.lock_store().clear_all();
    }

    fn lock_store(&self) -> MutexGuard<'_, VariableStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
