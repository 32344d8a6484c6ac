//! Placeholder parser for `${name}` syntax
//!
//! Extracts placeholder references with their byte spans. Malformed
//! input (unbalanced `${`, empty `${}`) produces no reference for the
//! affected region; the resolver then leaves that text untouched.

use std::ops::Range;

/// A parsed placeholder reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// The placeholder name (without `${` `}`), trimmed.
    pub name: String,

    /// Byte range of the full `${name}` token in the original string.
    pub span: Range<usize>,
}

impl PlaceholderRef {
    /// Creates a new placeholder reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Whether this references a dynamic built-in (`$`-prefixed name).
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with('$')
    }
}

/// Parses a string and extracts all placeholder references.
///
/// # Examples
///
/// ```
/// use stepflow_application::template::parse_placeholders;
///
/// let refs = parse_placeholders("Hello ${name}, id ${$uuid}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "name");
/// assert!(refs[1].is_builtin());
/// ```
#[must_use]
pub fn parse_placeholders(input: &str) -> Vec<PlaceholderRef> {
    let mut references = Vec::new();
    let mut from = 0;

    while let Some(open_rel) = input[from..].find("${") {
        let start = from + open_rel;
        let inner_start = start + 2;
        let Some(close_rel) = input[inner_start..].find('}') else {
            // Unbalanced `${`: the rest of the string passes through.
            break;
        };
        let end = inner_start + close_rel + 1;
        let raw_name = &input[inner_start..inner_start + close_rel];

        if raw_name.contains("${") {
            // `${` nested before the first `}`: the outer token is not a
            // placeholder; rescan from just past the outer opener so the
            // inner token is still found.
            from = inner_start;
            continue;
        }

        let name = raw_name.trim();
        if !name.is_empty() {
            references.push(PlaceholderRef::new(name, start..end));
        }
        from = end;
    }

    references
}

/// Cheap check for whether resolution could do anything at all.
#[must_use]
pub fn has_placeholders(input: &str) -> bool {
    input
        .find("${")
        .is_some_and(|at| input[at..].contains('}'))
}
