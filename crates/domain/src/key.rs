//! Fuzzy key patterns for variable lookups
//!
//! A stored variable key may embed one of two comparator functions:
//!
//! - `IGNORE_CASE(x)` - the `x` region matches case-insensitively
//! - `IGNORE_CHARS(x)` - the region is an arbitrary-content wildcard
//!
//! Keys are compiled once, when stored, into a small segment AST that the
//! store matches candidate names against. Only one function kind is honoured
//! per key; if a key somehow mixes both, the kind that appears first wins
//! and markers of the other kind are treated as literal text.

use serde::{Deserialize, Serialize};

const IGNORE_CASE_MARKER: &str = "IGNORE_CASE(";
const IGNORE_CHARS_MARKER: &str = "IGNORE_CHARS(";

/// One segment of a compiled key pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternSegment {
    /// Matched verbatim, case-sensitively.
    Literal(String),
    /// Matched case-insensitively against a region of the same length.
    IgnoreCase(String),
    /// Matches any run of characters, including the empty run.
    Wildcard,
}

/// A compiled fuzzy-match pattern for a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPattern {
    segments: Vec<PatternSegment>,
}

impl KeyPattern {
    /// Returns true when the key text embeds a comparator function and
    /// therefore needs pattern compilation.
    #[must_use]
    pub fn contains_function(key: &str) -> bool {
        key.contains(IGNORE_CASE_MARKER) || key.contains(IGNORE_CHARS_MARKER)
    }

    /// Compiles a stored key into a pattern.
    ///
    /// Compilation never fails: an unterminated marker is kept as literal
    /// text, so a key like `aIGNORE_CASE(b` only ever matches itself.
    #[must_use]
    pub fn compile(key: &str) -> Self {
        let case_at = key.find(IGNORE_CASE_MARKER);
        let chars_at = key.find(IGNORE_CHARS_MARKER);

        // First function kind found wins; the other is literal text.
        let (marker, ignore_case) = match (case_at, chars_at) {
            (Some(a), Some(b)) if a <= b => (IGNORE_CASE_MARKER, true),
            (Some(_), Some(_)) | (None, Some(_)) => (IGNORE_CHARS_MARKER, false),
            (Some(_), None) => (IGNORE_CASE_MARKER, true),
            (None, None) => {
                return Self {
                    segments: vec![PatternSegment::Literal(key.to_string())],
                };
            }
        };

        let mut segments = Vec::new();
        let mut rest = key;

        while let Some(start) = rest.find(marker) {
            let after_marker = &rest[start + marker.len()..];
            let Some(close) = after_marker.find(')') else {
                // Unterminated marker: keep the remainder literal.
                break;
            };

            let prefix = &rest[..start];
            if !prefix.is_empty() {
                segments.push(PatternSegment::Literal(prefix.to_string()));
            }

            let inner = &after_marker[..close];
            if ignore_case {
                segments.push(PatternSegment::IgnoreCase(inner.to_string()));
            } else {
                segments.push(PatternSegment::Wildcard);
            }

            rest = &after_marker[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(PatternSegment::Literal(rest.to_string()));
        }

        Self { segments }
    }

    /// Returns true when the candidate name matches this pattern.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let chars: Vec<char> = candidate.chars().collect();
        match_segments(&self.segments, &chars)
    }

    /// Returns the compiled segments, mainly for diagnostics.
    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }
}

fn match_segments(segments: &[PatternSegment], text: &[char]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return text.is_empty();
    };

    match first {
        PatternSegment::Literal(lit) => {
            let lit_chars: Vec<char> = lit.chars().collect();
            if text.len() < lit_chars.len() || text[..lit_chars.len()] != lit_chars[..] {
                return false;
            }
            match_segments(rest, &text[lit_chars.len()..])
        }
        PatternSegment::IgnoreCase(lit) => {
            let lit_chars: Vec<char> = lit.chars().collect();
            if text.len() < lit_chars.len() {
                return false;
            }
            let region_matches = lit_chars
                .iter()
                .zip(&text[..lit_chars.len()])
                .all(|(a, b)| chars_eq_ignore_case(*a, *b));
            if !region_matches {
                return false;
            }
            match_segments(rest, &text[lit_chars.len()..])
        }
        PatternSegment::Wildcard => {
            // Zero-or-more: try every split point, shortest first.
            (0..=text.len()).any(|i| match_segments(rest, &text[i..]))
        }
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
