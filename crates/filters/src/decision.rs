use std::path::Path;

use crate::compiled::CompiledRule;

#[derive(Debug, Default)]
pub(crate) struct FilterSetInner {
    pub(crate) includes: Vec<CompiledRule>,
    pub(crate) excludes: Vec<CompiledRule>,
}

impl FilterSetInner {
    pub(crate) fn decision(&self, path: &Path) -> FilterDecision {
        if let Some(rule) = self.excludes.iter().find(|rule| rule.matches_path(path)) {
            return FilterDecision::Excluded {
                pattern: rule.pattern.clone(),
            };
        }

        if self.includes.is_empty() || self.includes.iter().any(|rule| rule.matches_path(path)) {
            FilterDecision::Included
        } else {
            FilterDecision::NotIncluded
        }
    }

    pub(crate) fn excludes_directory(&self, path: &Path) -> bool {
        self.excludes
            .iter()
            .any(|rule| rule.matches_directory(path))
    }
}

/// Verdict reached for a single path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterDecision {
    /// The path takes part in the transfer.
    Included,
    /// An exclude rule matched the path.
    Excluded {
        /// Pattern of the first exclude rule that matched.
        pattern: String,
    },
    /// Include rules exist but none of them matched the path.
    NotIncluded,
}

impl FilterDecision {
    /// Returns `true` when the path should be transferred.
    #[must_use]
    pub const fn is_included(&self) -> bool {
        matches!(self, Self::Included)
    }
}
