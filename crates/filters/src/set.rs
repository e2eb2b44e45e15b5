use std::path::Path;
use std::sync::Arc;

use crate::{
    FilterAction, FilterDecision, FilterError, FilterRule, compiled::CompiledRule,
    decision::FilterSetInner,
};

/// Compiled, immutable collection of filter rules for fast path matching.
///
/// A `FilterSet` is built from a sequence of [`FilterRule`]s via
/// [`from_rules`](Self::from_rules). Include and exclude rules are kept in
/// separate lists; rule order does not affect the outcome because an exclude
/// match always wins over an include match.
///
/// `FilterSet` is cheaply cloneable (the inner state is behind an [`Arc`]).
///
/// # Examples
///
/// ```
/// use filters::{FilterRule, FilterSet};
/// use std::path::Path;
///
/// let set = FilterSet::from_rules([
///     FilterRule::include("*.csv"),
///     FilterRule::exclude("draft_*"),
/// ])
/// .unwrap();
///
/// assert!(set.allows(Path::new("2024/report.csv")));
/// assert!(!set.allows(Path::new("draft_report.csv")));
/// assert!(!set.allows(Path::new("README.md")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    inner: Arc<FilterSetInner>,
}

impl FilterSet {
    /// Builds a [`FilterSet`] from the supplied rules.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if any rule's pattern cannot be compiled into a
    /// valid glob matcher.
    pub fn from_rules<I>(rules: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = FilterRule>,
    {
        let mut inner = FilterSetInner::default();

        for rule in rules {
            #[cfg(feature = "tracing")]
            tracing::trace!(target: "s3bulk::filter", rule = %rule, "compiling filter rule");

            let action = rule.action;
            let compiled = CompiledRule::new(rule)?;
            match action {
                FilterAction::Include => inner.includes.push(compiled),
                FilterAction::Exclude => inner.excludes.push(compiled),
            }
        }

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns `true` if the set contains no compiled rules.
    ///
    /// An empty filter set allows every path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.includes.is_empty() && self.inner.excludes.is_empty()
    }

    /// Returns `true` if the file at `path` (relative to the transfer root)
    /// should be transferred.
    #[must_use]
    pub fn allows(&self, path: &Path) -> bool {
        self.decide(path).is_included()
    }

    /// Returns the detailed verdict for `path`.
    #[must_use]
    pub fn decide(&self, path: &Path) -> FilterDecision {
        self.inner.decision(path)
    }

    /// Returns `true` when every file beneath the directory at `path` is
    /// excluded, so a traversal may skip it entirely.
    ///
    /// Include rules never prune directories because a deeper file might
    /// still match them.
    #[must_use]
    pub fn excludes_directory(&self, path: &Path) -> bool {
        self.inner.excludes_directory(path)
    }
}
