//! Placeholder templating
//!
//! Scenario text may contain `${name}` placeholders. Resolution reads the
//! variable store first, then the configuration source; `$`-prefixed names
//! are dynamic built-ins. Unresolved or malformed placeholders pass through
//! unchanged so literal `${...}`-shaped text never fails a scenario.

mod builtins;
pub mod parser;
mod resolver;

pub use builtins::Builtins;
pub use parser::{has_placeholders, parse_placeholders, PlaceholderRef};
pub use resolver::{ResolveOptions, TemplateResolver, DEFAULT_MAX_DEPTH};
