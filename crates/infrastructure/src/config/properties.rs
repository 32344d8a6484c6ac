//! Java-style `.properties` configuration files.
//!
//! The conventional configuration format for this kind of test harness:
//! one `key=value` per line, `#` or `!` comments, and an ordered list of
//! files where the first file defining a key wins. That lets a suite layer
//! an environment-specific file over shared defaults.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use stepflow_application::ports::ConfigSource;

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// The offending file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Configuration backed by one or more `.properties` files.
#[derive(Debug, Clone, Default)]
pub struct PropertiesConfig {
    values: HashMap<String, String>,
}

impl PropertiesConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a single file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_files(&[path])
    }

    /// Loads an ordered list of files. Earlier files take precedence:
    /// a key already defined is never overwritten by a later file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when any file cannot be read.
    pub fn from_files(paths: &[impl AsRef<Path>]) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        for path in paths {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let before = config.values.len();
            config.merge(&content);
            debug!(
                path = %path.display(),
                loaded = config.values.len() - before,
                "loaded properties file"
            );
        }
        Ok(config)
    }

    /// Parses properties from a string, keeping existing entries.
    fn merge(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = split_property(line) else {
                continue;
            };
            self.values
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no entries are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for PropertiesConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Splits a property line at the first `=` or `:`, whichever comes first.
fn split_property(line: &str) -> Option<(&str, &str)> {
    let split_at = line.find(['=', ':'])?;
    let (key, rest) = line.split_at(split_at);
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, rest[1..].trim()))
}
