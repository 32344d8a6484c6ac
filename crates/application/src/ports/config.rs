//! Configuration source port

use std::collections::HashMap;

/// A process-wide, read-mostly key/value configuration source, consulted
/// by the template resolver after the variable store.
pub trait ConfigSource: Send + Sync {
    /// Looks up a configuration value.
    fn get(&self, key: &str) -> Option<String>;

    /// As [`get`](Self::get), falling back to `default` on a miss or an
    /// empty value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// In-memory configuration, used in tests and as a no-op default.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from key/value pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Inserts a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
