// crates/filters/src/matcher.rs

use crate::rule::Rule;

/// Which rule set an entry name is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    File,
    Folder,
}

/// An ordered rule list plus the default verdict for unmatched names.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    default_include: bool,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, default_include: bool) -> Self {
        Self {
            rules,
            default_include,
        }
    }

    /// A set with no rules; every name is included.
    pub fn include_all() -> Self {
        Self::new(Vec::new(), true)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn default_include(&self) -> bool {
        self.default_include
    }

    /// First matching rule wins; otherwise the set's default applies.
    pub fn matches(&self, name: &str) -> bool {
        for rule in &self.rules {
            if rule.is_match(name) {
                tracing::trace!(
                    "{name}: {} by rule {:?}",
                    if rule.include() { "included" } else { "excluded" },
                    rule.pattern()
                );
                return rule.include();
            }
        }
        self.default_include
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::include_all()
    }
}

/// Independent file and folder rule sets.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    files: RuleSet,
    folders: RuleSet,
}

impl Matcher {
    pub fn new(files: RuleSet, folders: RuleSet) -> Self {
        Self { files, folders }
    }

    pub fn include_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, name: &str, kind: NameKind) -> bool {
        match kind {
            NameKind::File => self.files.matches(name),
            NameKind::Folder => self.folders.matches(name),
        }
    }

    pub fn files(&self) -> &RuleSet {
        &self.files
    }

    pub fn folders(&self) -> &RuleSet {
        &self.folders
    }
}
