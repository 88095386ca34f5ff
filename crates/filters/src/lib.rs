// crates/filters/src/lib.rs

//! Name filtering for directory synchronization.
//!
//! Rules are evaluated in declaration order and the first matching rule
//! wins. Files and folders have independent rule sets, each with its own
//! default verdict for names no rule matches. The default is plain data
//! computed by the caller (the CLI derives it from argument order); this
//! crate never inspects how rules were declared.

mod matcher;
mod rule;

pub use matcher::{Matcher, NameKind, RuleSet};
pub use rule::Rule;
