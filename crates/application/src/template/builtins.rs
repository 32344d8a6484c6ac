//! Built-in dynamic placeholders
//!
//! `$`-prefixed placeholder names generate a fresh value per resolution
//! session (`${$uuid}`, `${$timestamp}`, ...). The resolver caches the
//! generated values so one session sees a consistent value.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Generates values for built-in dynamic placeholders.
pub struct Builtins;

impl Builtins {
    /// Resolves a built-in placeholder name, `$` prefix included.
    /// Returns `None` for unrecognised names.
    #[must_use]
    pub fn resolve(name: &str) -> Option<String> {
        match name {
            "$uuid" => Some(Uuid::new_v4().to_string()),
            "$timestamp" => Some(Utc::now().timestamp().to_string()),
            "$isoTimestamp" => Some(Utc::now().to_rfc3339()),
            "$randomInt" => Some(rand::rng().random_range(0..=1000).to_string()),
            "$randomAlphanumeric" => Some(
                rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(8)
                    .map(char::from)
                    .collect(),
            ),
            "$date" => Some(Utc::now().format("%Y-%m-%d").to_string()),
            _ => None,
        }
    }

    /// Whether the name is a recognised built-in.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        Self::resolve(name).is_some()
    }
}
