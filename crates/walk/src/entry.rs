use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A regular file discovered during traversal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalkEntry {
    pub(crate) full_path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) size: u64,
    pub(crate) depth: usize,
}

impl WalkEntry {
    /// Returns the absolute path to the file.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Returns the path relative to the traversal root.
    ///
    /// When the root itself is a file this is the file name.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Returns the file size in bytes, following symlinks.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Number of path components in the relative path (direct children are `1`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the final component of the path.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.relative_path.file_name()
    }

    /// Consumes the entry, returning `(full_path, relative_path, size)`.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, PathBuf, u64) {
        (self.full_path, self.relative_path, self.size)
    }
}
