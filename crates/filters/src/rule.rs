// crates/filters/src/rule.rs

use globset::{GlobBuilder, GlobMatcher};

/// One include or exclude pattern, matched against bare entry names.
///
/// Patterns use glob semantics (`*`, `?`, bracket classes). Names never
/// contain path separators, so `*` is allowed to match anything.
#[derive(Clone, Debug)]
pub struct Rule {
    matcher: GlobMatcher,
    include: bool,
    pattern: String,
}

impl Rule {
    pub fn new(pattern: &str, include: bool, case_insensitive: bool) -> Result<Self, globset::Error> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .backslash_escape(true)
            .case_insensitive(case_insensitive)
            .build()?
            .compile_matcher();
        Ok(Self {
            matcher,
            include,
            pattern: pattern.to_string(),
        })
    }

    pub fn include(&self) -> bool {
        self.include
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn is_match(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }
}
