//! The template resolver
//!
//! Substitutes `${name}` placeholders left-to-right, consulting built-ins,
//! then the scenario's variable store, then the configuration source.
//! Resolution is iterative so resolved values may themselves contain
//! placeholders; a depth cap guards against circular references.

use std::collections::HashMap;

use tracing::warn;

use crate::ports::ConfigSource;
use crate::template::builtins::Builtins;
use crate::template::parser;
use crate::variables::VariableStore;

/// Safety cap for nested resolution passes. Circular references (`a=${b}`,
/// `b=${a}`) terminate here instead of looping.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Knobs for one resolution session.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Collapse literal `\r\n` sequences to `\n` after substitution.
    /// Disable for raw content blocks (inline JSON/XML bodies) that must
    /// keep their bytes untouched.
    pub normalize_newlines: bool,

    /// Maximum nested resolution passes before giving up.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            normalize_newlines: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolveOptions {
    /// Options for raw content blocks: no newline normalization.
    #[must_use]
    pub fn raw() -> Self {
        Self::default()
    }

    /// Options with newline normalization enabled.
    #[must_use]
    pub fn normalized() -> Self {
        Self {
            normalize_newlines: true,
            ..Self::default()
        }
    }
}

/// Resolves `${name}` placeholders against a variable store and a
/// configuration source.
///
/// Resolution is a pure read of the store. Unresolvable placeholders pass
/// through literally (with a logged warning) so literal `${...}`-shaped
/// text never fails a scenario.
pub struct TemplateResolver<'a> {
    store: &'a VariableStore,
    config: &'a dyn ConfigSource,
    options: ResolveOptions,
    /// Built-ins generate fresh values; cache them so one session is
    /// internally consistent.
    builtin_cache: HashMap<String, String>,
}

impl<'a> TemplateResolver<'a> {
    /// Creates a resolver with default options.
    #[must_use]
    pub fn new(store: &'a VariableStore, config: &'a dyn ConfigSource) -> Self {
        Self::with_options(store, config, ResolveOptions::default())
    }

    /// Creates a resolver with explicit options.
    #[must_use]
    pub fn with_options(
        store: &'a VariableStore,
        config: &'a dyn ConfigSource,
        options: ResolveOptions,
    ) -> Self {
        Self {
            store,
            config,
            options,
            builtin_cache: HashMap::new(),
        }
    }

    /// Discards cached built-in values so the next resolution generates
    /// fresh ones.
    pub fn clear_builtin_cache(&mut self) {
        self.builtin_cache.clear();
    }

    /// Resolves all placeholders in `input`, iterating until a fixed point
    /// or the depth cap.
    #[must_use]
    pub fn resolve(&mut self, input: &str) -> String {
        let mut current = input.to_string();
        let mut depth = 0;

        loop {
            let (next, changed) = self.resolve_once(&current);
            current = next;
            if !changed {
                break;
            }
            depth += 1;
            if depth >= self.options.max_depth {
                if parser::has_placeholders(&current) {
                    warn!(
                        max_depth = self.options.max_depth,
                        "placeholder nesting exceeded depth cap; returning partially resolved text"
                    );
                }
                break;
            }
        }

        if self.options.normalize_newlines {
            current = current.replace("\r\n", "\n");
        }
        current
    }

    /// Resolves every string in an ordered sequence, preserving order.
    #[must_use]
    pub fn resolve_list(&mut self, items: &[String]) -> Vec<String> {
        items.iter().map(|item| self.resolve(item)).collect()
    }

    /// Resolves every value in a map, preserving the key set.
    #[must_use]
    pub fn resolve_map(&mut self, map: &HashMap<String, String>) -> HashMap<String, String> {
        map.iter()
            .map(|(k, v)| (k.clone(), self.resolve(v)))
            .collect()
    }

    /// Resolves every cell in a table, preserving row and column shape.
    #[must_use]
    pub fn resolve_table(&mut self, rows: &[Vec<String>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| self.resolve(cell)).collect())
            .collect()
    }

    /// One substitution pass. Returns the rewritten text and whether any
    /// placeholder was actually substituted.
    fn resolve_once(&mut self, input: &str) -> (String, bool) {
        let references = parser::parse_placeholders(input);
        if references.is_empty() {
            return (input.to_string(), false);
        }

        let mut output = String::with_capacity(input.len());
        let mut last_end = 0;
        let mut changed = false;

        for reference in &references {
            output.push_str(&input[last_end..reference.span.start]);

            if let Some(value) = self.lookup(&reference.name) {
                output.push_str(&value);
                changed = true;
            } else {
                // Pass through literally; the text may be intentional.
                warn!(name = %reference.name, "placeholder not resolvable; passing through");
                output.push_str(&input[reference.span.clone()]);
            }

            last_end = reference.span.end;
        }

        output.push_str(&input[last_end..]);
        (output, changed)
    }

    /// Single-name lookup: built-ins, then the store, then configuration.
    /// A `$`-prefixed name that is not a recognised built-in is still an
    /// ordinary store/config key.
    fn lookup(&mut self, name: &str) -> Option<String> {
        if name.starts_with('$') {
            if let Some(cached) = self.builtin_cache.get(name) {
                return Some(cached.clone());
            }
            if let Some(generated) = Builtins::resolve(name) {
                self.builtin_cache
                    .insert(name.to_string(), generated.clone());
                return Some(generated);
            }
        }

        if let Some(value) = self.store.get(name) {
            return Some(value.to_string());
        }
        self.config.get(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::ports::config::MapConfig;

    use super::*;

    fn store_with(pairs: &[(&str, &str)]) -> VariableStore {
        let mut store = VariableStore::new();
        for (k, v) in pairs {
            store.set(k, *v);
        }
        store
    }

    #[test]
    fn simple_substitution() {
        let store = store_with(&[("name", "Alice")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        assert_eq!(resolver.resolve("Hello ${name}"), "Hello Alice");
    }

    #[test]
    fn unresolved_placeholder_passes_through() {
        let store = VariableStore::new();
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        assert_eq!(resolver.resolve("${foo}"), "${foo}");
    }

    #[test]
    fn config_is_the_fallback_source() {
        let store = store_with(&[("name", "from-store")]);
        let config = MapConfig::from_pairs(&[("name", "from-config"), ("env", "staging")]);
        let mut resolver = TemplateResolver::new(&store, &config);

        // Store wins over config; config fills store misses.
        assert_eq!(resolver.resolve("${name}/${env}"), "from-store/staging");
    }

    #[test]
    fn nested_resolution() {
        let store = store_with(&[("name", "${inner}"), ("inner", "done")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        assert_eq!(resolver.resolve("${name}"), "done");
    }

    #[test]
    fn circular_reference_terminates() {
        let store = store_with(&[("a", "${b}"), ("b", "${a}")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        // Must not loop; the result still carries a placeholder.
        let resolved = resolver.resolve("${a}");
        assert!(resolved.contains("${"));
    }

    #[test]
    fn malformed_placeholder_passes_through() {
        let store = store_with(&[("name", "Alice")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        assert_eq!(resolver.resolve("broken ${name"), "broken ${name");
    }

    #[test]
    fn resolves_lists_preserving_order() {
        let store = store_with(&[("a", "1"), ("b", "2")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        let resolved = resolver.resolve_list(&["${a}".to_string(), "${b}".to_string()]);
        assert_eq!(resolved, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn resolves_map_values_preserving_keys() {
        let store = store_with(&[("host", "localhost")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        let mut map = HashMap::new();
        map.insert("url".to_string(), "http://${host}".to_string());
        let resolved = resolver.resolve_map(&map);

        assert_eq!(resolved.get("url").map(String::as_str), Some("http://localhost"));
    }

    #[test]
    fn resolves_table_preserving_shape() {
        let store = store_with(&[("v", "x")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        let table = vec![
            vec!["${v}".to_string(), "plain".to_string()],
            vec!["${missing}".to_string()],
        ];
        let resolved = resolver.resolve_table(&table);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0], vec!["x".to_string(), "plain".to_string()]);
        assert_eq!(resolved[1], vec!["${missing}".to_string()]);
    }

    #[test]
    fn newline_normalization_is_opt_in() {
        let store = VariableStore::new();
        let config = MapConfig::default();

        let mut raw = TemplateResolver::new(&store, &config);
        assert_eq!(raw.resolve("a\r\nb"), "a\r\nb");

        let mut normalized =
            TemplateResolver::with_options(&store, &config, ResolveOptions::normalized());
        assert_eq!(normalized.resolve("a\r\nb"), "a\nb");
    }

    #[test]
    fn builtin_values_are_cached_per_session() {
        let store = VariableStore::new();
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);

        let first = resolver.resolve("${$uuid}");
        let second = resolver.resolve("${$uuid}");
        assert_eq!(first, second);

        resolver.clear_builtin_cache();
        let third = resolver.resolve("${$uuid}");
        assert_ne!(first, third);
    }

    #[test]
    fn dollar_prefixed_names_fall_back_to_store_and_config() {
        let store = store_with(&[("$custom", "from-store")]);
        let config = MapConfig::from_pairs(&[("$setting", "from-config")]);
        let mut resolver = TemplateResolver::new(&store, &config);

        assert_eq!(resolver.resolve("${$custom}"), "from-store");
        assert_eq!(resolver.resolve("${$setting}"), "from-config");
        // Unknown everywhere still passes through.
        assert_eq!(resolver.resolve("${$nope}"), "${$nope}");
    }

    #[test]
    fn resolution_does_not_mutate_the_store() {
        let store = store_with(&[("name", "Alice")]);
        let config = MapConfig::default();
        let mut resolver = TemplateResolver::new(&store, &config);
        let _ = resolver.resolve("${name} and ${missing}");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("name"), Some("Alice"));
    }
}
