//! The per-scenario variable store
//!
//! String-keyed, string-valued storage with whitespace-normalized keys and
//! fuzzy-match retrieval. Keys that embed a comparator function
//! (`IGNORE_CASE(x)` / `IGNORE_CHARS(x)`) are compiled once when stored;
//! `get` falls back to scanning those patterns in insertion order when the
//! exact lookup misses, so ties resolve to the first key registered.

use std::collections::HashMap;

use stepflow_domain::{DomainResult, KeyPattern, Value};

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    pattern: Option<KeyPattern>,
    value: String,
}

/// Thread-confined key/value table for one scenario execution.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

/// Maps every whitespace character in a key to an underscore.
fn normalize_key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the normalized `name`, overwriting any
    /// previous value. Values are kept verbatim.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let key = normalize_key(name);
        let value = value.into();
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].value = value;
            return;
        }
        let pattern = KeyPattern::contains_function(&key).then(|| KeyPattern::compile(&key));
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry {
            key,
            pattern,
            value,
        });
    }

    /// Looks up a value by name.
    ///
    /// The normalized name is first matched exactly; on a miss, stored keys
    /// carrying a comparator function are tried in insertion order. Returns
    /// `None` when nothing matches - never an error.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let lookup = normalize_key(name);
        if let Some(&idx) = self.index.get(&lookup) {
            return Some(self.entries[idx].value.as_str());
        }
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .pattern
                    .as_ref()
                    .is_some_and(|p| p.matches(&lookup))
            })
            .map(|entry| entry.value.as_str())
    }

    /// As [`get`](Self::get), but falls back to `default` when the lookup
    /// misses or the stored value is empty.
    #[must_use]
    pub fn get_or_default(&self, name: &str, default: &str) -> String {
        match self.get(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// Exact-key existence check (no fuzzy matching).
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_key(name))
    }

    /// Iterates over all `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Returns the keys sharing a namespace prefix, in insertion order.
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.key.starts_with(prefix))
            .map(|entry| entry.key.as_str())
            .collect()
    }

    /// Number of stored variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes everything.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Removes a single key (exact match). Returns the removed value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = normalize_key(name);
        let idx = self.index.remove(&key)?;
        let entry = self.entries.remove(idx);
        self.reindex();
        Some(entry.value)
    }

    /// Removes every key starting with `prefix`, e.g. `ResponseHeaders.`.
    pub fn clear_prefix(&mut self, prefix: &str) {
        self.entries.retain(|entry| !entry.key.starts_with(prefix));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.key.clone(), i))
            .collect();
    }

    /// Typed view of a stored value.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::detect)
    }

    /// Parses a stored value as a number.
    ///
    /// # Errors
    ///
    /// Returns [`stepflow_domain::DomainError::Parse`] when the stored
    /// value is not numeric. A missing key is `Ok(None)`.
    pub fn get_number(&self, name: &str) -> DomainResult<Option<f64>> {
        self.get(name)
            .map(|raw| Value::Text(raw.to_string()).as_number())
            .transpose()
    }

    /// Parses a stored value as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`stepflow_domain::DomainError::Parse`] when the stored
    /// value is not `true`/`false`. A missing key is `Ok(None)`.
    pub fn get_bool(&self, name: &str) -> DomainResult<Option<bool>> {
        self.get(name)
            .map(|raw| Value::Text(raw.to_string()).as_bool())
            .transpose()
    }

    /// Parses a stored value as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`stepflow_domain::DomainError::Parse`] when the stored
    /// value is not valid JSON. A missing key is `Ok(None)`.
    pub fn get_json(&self, name: &str) -> DomainResult<Option<serde_json::Value>> {
        self.get(name)
            .map(|raw| Value::Text(raw.to_string()).as_json())
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_then_get_round_trips_value_exactly() {
        let mut store = VariableStore::new();
        store.set("token", "  spaced value \n");
        assert_eq!(store.get("token"), Some("  spaced value \n"));
    }

    #[test]
    fn key_whitespace_normalizes_to_underscore() {
        let mut store = VariableStore::new();
        store.set("a b", "v");
        assert_eq!(store.get("a_b"), Some("v"));
        assert_eq!(store.get("a b"), Some("v"));
        assert_eq!(store.get("a\tb"), Some("v"));
    }

    #[test]
    fn set_overwrites() {
        let mut store = VariableStore::new();
        store.set("k", "1");
        store.set("k", "2");
        assert_eq!(store.get("k"), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_miss_is_none() {
        let store = VariableStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn get_or_default_covers_missing_and_empty() {
        let mut store = VariableStore::new();
        store.set("empty", "");
        assert_eq!(store.get_or_default("empty", "fallback"), "fallback");
        assert_eq!(store.get_or_default("missing", "fallback"), "fallback");
        store.set("set", "value");
        assert_eq!(store.get_or_default("set", "fallback"), "value");
    }

    #[test]
    fn ignore_case_key_matches_lookup() {
        let mut store = VariableStore::new();
        store.set("httpIGNORE_CASE(h)eader", "v");
        assert_eq!(store.get("httpHeader"), Some("v"));
        assert_eq!(store.get("httpheader"), Some("v"));
        assert_eq!(store.get("httpXeader"), None);
    }

    #[test]
    fn ignore_chars_key_matches_any_middle() {
        let mut store = VariableStore::new();
        store.set("worker_IGNORE_CHARS(*)_data", "v");
        assert_eq!(store.get("worker_abc123_data"), Some("v"));
        assert_eq!(store.get("worker__data"), Some("v"));
        assert_eq!(store.get("worker_x_datum"), None);
    }

    #[test]
    fn has_is_exact_only() {
        let mut store = VariableStore::new();
        store.set("httpIGNORE_CASE(h)eader", "v");
        assert!(store.has("httpIGNORE_CASE(h)eader"));
        assert!(!store.has("httpHeader"));
    }

    #[test]
    fn fuzzy_ties_resolve_to_first_registered() {
        let mut store = VariableStore::new();
        store.set("x_IGNORE_CHARS(a)", "first");
        store.set("x_IGNORE_CHARS(b)g", "second");
        // Both patterns match "x_anything"; insertion order decides.
        assert_eq!(store.get("x_anything"), Some("first"));
    }

    #[test]
    fn clear_prefix_removes_namespace_only() {
        let mut store = VariableStore::new();
        store.set("ResponseHeaders.Content-Type", "application/json");
        store.set("ResponseHeaders.X-Trace", "abc");
        store.set("RESPONSE", "body");
        store.clear_prefix("ResponseHeaders.");

        assert_eq!(store.get("ResponseHeaders.Content-Type"), None);
        assert_eq!(store.get("RESPONSE"), Some("body"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keys_with_prefix_filters() {
        let mut store = VariableStore::new();
        store.set("ResponseCookie.session", "s1");
        store.set("ResponseCookie.trace", "t1");
        store.set("other", "x");
        assert_eq!(
            store.keys_with_prefix("ResponseCookie."),
            vec!["ResponseCookie.session", "ResponseCookie.trace"]
        );
    }

    #[test]
    fn remove_keeps_later_lookups_consistent() {
        let mut store = VariableStore::new();
        store.set("a", "1");
        store.set("b", "2");
        store.set("c", "3");
        assert_eq!(store.remove("b"), Some("2".to_string()));
        assert_eq!(store.get("a"), Some("1"));
        assert_eq!(store.get("c"), Some("3"));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn clear_all_empties_the_store() {
        let mut store = VariableStore::new();
        store.set("k", "v");
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn typed_getters_parse_on_demand() {
        let mut store = VariableStore::new();
        store.set("count", "41");
        store.set("flag", "true");
        store.set("payload", r#"{"ok": true}"#);
        store.set("word", "hello");

        assert_eq!(store.get_number("count").unwrap(), Some(41.0));
        assert_eq!(store.get_bool("flag").unwrap(), Some(true));
        assert_eq!(
            store.get_json("payload").unwrap(),
            Some(serde_json::json!({"ok": true}))
        );
        assert!(store.get_number("word").is_err());
        assert_eq!(store.get_number("missing").unwrap(), None);
    }
}
