use crate::error::WalkError;
use crate::walker::Walker;
use filters::FilterSet;
use std::path::PathBuf;

/// Depth limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configures a filesystem traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    filters: FilterSet,
    follow_symlinks: bool,
    recursive: bool,
    max_depth: usize,
}

impl WalkBuilder {
    /// Creates a new builder that will traverse the provided root path.
    ///
    /// Defaults: no filters, recursive, directory symlinks not followed and a
    /// depth limit of [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            filters: FilterSet::default(),
            follow_symlinks: false,
            recursive: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Applies include/exclude filters to yielded files and prunes excluded
    /// directories.
    #[must_use]
    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Configures whether symlinks to directories are descended into.
    ///
    /// Symlinks to regular files are always yielded. Canonical paths of
    /// visited directories are tracked to prevent infinite loops.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// When disabled only the root's direct children are considered.
    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Limits how many directory levels below the root are entered.
    ///
    /// Directories deeper than the limit are skipped with a warning.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builds a [`Walker`] using the configured options.
    pub fn build(self) -> Result<Walker, WalkError> {
        let max_depth = if self.recursive { self.max_depth } else { 0 };
        Walker::new(self.root, self.filters, self.follow_symlinks, max_depth)
    }
}
