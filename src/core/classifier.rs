use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// Directory-name exclusion rules.
///
/// Patterns are matched against a single path segment, case-insensitively,
/// with shell wildcard semantics (`*`, `?`, `[abc]`). A directory that
/// matches is pruned: nothing beneath it is ever read.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExclusionSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for raw in patterns {
            let pattern = raw.as_ref().trim().trim_end_matches(['/', '\\']);
            if pattern.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }

        let set = builder
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: kept.join(","),
                source,
            })?;

        Ok(Self {
            patterns: kept,
            set,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// True when `name` (one path segment, not a full path) matches any pattern.
    pub fn is_excluded<P: AsRef<Path>>(&self, name: P) -> bool {
        !self.set.is_empty() && self.set.is_match(name.as_ref())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_names_ignore_case() {
        let set = ExclusionSet::new(["node_modules", ".git"]).unwrap();
        assert!(set.is_excluded("node_modules"));
        assert!(set.is_excluded("Node_Modules"));
        assert!(set.is_excluded(".GIT"));
        assert!(!set.is_excluded("node_modules_backup"));
        assert!(!set.is_excluded("src"));
    }

    #[test]
    fn wildcards() {
        let set = ExclusionSet::new(["*.cache", "build?", "tmp[0-9]"]).unwrap();
        assert!(set.is_excluded("pip.cache"));
        assert!(set.is_excluded("build1"));
        assert!(!set.is_excluded("build"));
        assert!(!set.is_excluded("build12"));
        assert!(set.is_excluded("TMP7"));
        assert!(!set.is_excluded("tmpx"));
    }

    #[test]
    fn wildcards_are_not_regex() {
        let set = ExclusionSet::new(["a.c"]).unwrap();
        assert!(set.is_excluded("a.c"));
        assert!(!set.is_excluded("abc"));
    }

    #[test]
    fn blank_and_trailing_slash_patterns() {
        let set = ExclusionSet::new(["", "  ", "target/"]).unwrap();
        assert_eq!(set.patterns(), &["target".to_string()]);
        assert!(set.is_excluded("target"));
    }

    #[test]
    fn empty_set_excludes_nothing() {
        let set = ExclusionSet::empty();
        assert!(set.is_empty());
        assert!(!set.is_excluded("anything"));
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = ExclusionSet::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
