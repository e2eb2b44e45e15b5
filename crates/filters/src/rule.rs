use std::fmt;

use crate::FilterAction;

/// User-visible filter rule consisting of an action and pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterRule {
    pub(crate) action: FilterAction,
    pub(crate) pattern: String,
}

impl FilterRule {
    /// Creates an include rule for `pattern`.
    #[must_use]
    pub fn include(pattern: impl Into<String>) -> Self {
        Self {
            action: FilterAction::Include,
            pattern: pattern.into(),
        }
    }

    /// Creates an exclude rule for `pattern`.
    #[must_use]
    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self {
            action: FilterAction::Exclude,
            pattern: pattern.into(),
        }
    }

    /// Returns the rule action.
    #[must_use]
    pub const fn action(&self) -> FilterAction {
        self.action
    }

    /// Returns the pattern text associated with the rule.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns `true` when the pattern only applies to directories (trailing `/`).
    #[must_use]
    pub fn is_directory_only(&self) -> bool {
        self.pattern.len() > 1 && self.pattern.ends_with('/')
    }

    /// Returns `true` when the pattern is anchored to the transfer root.
    ///
    /// A pattern is anchored when it starts with `/` or contains a `/` before
    /// its final character.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        let trimmed = self.pattern.strip_suffix('/').unwrap_or(&self.pattern);
        trimmed.contains('/')
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_action_and_pattern() {
        let include = FilterRule::include("*.txt");
        assert_eq!(include.action(), FilterAction::Include);
        assert_eq!(include.pattern(), "*.txt");

        let exclude = FilterRule::exclude("tmp/");
        assert_eq!(exclude.action(), FilterAction::Exclude);
        assert_eq!(exclude.to_string(), "exclude tmp/");
    }

    #[test]
    fn anchoring_follows_slash_placement() {
        assert!(!FilterRule::include("*.txt").is_anchored());
        assert!(!FilterRule::include("build/").is_anchored());
        assert!(FilterRule::include("/build/").is_anchored());
        assert!(FilterRule::include("logs/*.txt").is_anchored());
        assert!(FilterRule::include("/README").is_anchored());
    }

    #[test]
    fn directory_only_requires_trailing_slash() {
        assert!(FilterRule::exclude("cache/").is_directory_only());
        assert!(!FilterRule::exclude("cache").is_directory_only());
        assert!(!FilterRule::exclude("/").is_directory_only());
    }
}
