//! Candidate enumeration from a local tree, a remote listing, or an explicit
//! file list.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::vec;

use filters::FilterSet;
use logging::targets::FLIST;
use tracing::{debug, warn};
use transport::{Endpoint, ObjectLister, ObjectUri};
use walk::{WalkBuilder, Walker};

use crate::{Candidate, EnumerationError};

enum Source {
    Local(Walker),
    Prepared(vec::IntoIter<Candidate>),
}

/// Single-pass iterator over transfer candidates.
///
/// Local enumeration is lazy and stops after the first error. Remote and
/// explicit-file enumeration are resolved up front and never fail once
/// constructed.
pub struct PathEnumerator {
    source: Source,
}

impl fmt::Debug for PathEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            Source::Local(_) => "local",
            Source::Prepared(_) => "prepared",
        };
        f.debug_struct("PathEnumerator").field("source", &kind).finish()
    }
}

impl PathEnumerator {
    /// Enumerates regular files below the builder's root.
    ///
    /// # Errors
    ///
    /// Fails when the root is missing, unreadable or not a file or directory.
    pub fn local(builder: WalkBuilder) -> Result<Self, EnumerationError> {
        Ok(Self {
            source: Source::Local(builder.build()?),
        })
    }

    /// Enumerates objects stored under `prefix` in `bucket`.
    ///
    /// Directory placeholders and objects outside the prefix are dropped.
    /// Keys that would escape a local destination are kept here and left to
    /// [`TaskBuilder`](crate::TaskBuilder), which records them as rejected.
    ///
    /// # Errors
    ///
    /// Fails when the bucket name is invalid or the listing itself fails.
    pub fn remote<L>(
        lister: &L,
        bucket: &str,
        prefix: &str,
        filters: &FilterSet,
    ) -> Result<Self, EnumerationError>
    where
        L: ObjectLister + ?Sized,
    {
        ObjectUri::new(bucket, String::new())?;
        debug!(target: FLIST, uri = %ObjectUri::listing(bucket, prefix), "listing remote objects");
        let objects = lister.list(bucket, prefix)?;
        let prefix = prefix.trim_matches('/');

        let mut candidates = Vec::with_capacity(objects.len());
        for object in objects {
            let relative = if prefix.is_empty() {
                object.key.as_str()
            } else if let Some(rest) = object
                .key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                rest
            } else {
                debug!(target: FLIST, key = %object.key, "object outside prefix");
                continue;
            };

            if relative.is_empty() || relative.ends_with('/') {
                debug!(target: FLIST, key = %object.key, "skipping directory placeholder");
                continue;
            }
            if !filters.allows(Path::new(relative)) {
                continue;
            }

            let uri = ObjectUri::new(bucket, object.key.clone())?;
            candidates.push(Candidate::new(
                Endpoint::Remote(uri),
                relative,
                Some(object.size),
            ));
        }

        debug!(target: FLIST, count = candidates.len(), "remote enumeration complete");
        Ok(Self {
            source: Source::Prepared(candidates.into_iter()),
        })
    }

    /// Enumerates an explicit list of local files.
    ///
    /// Paths that do not exist or are not regular files are skipped with a
    /// warning. Each candidate's relative key is its file name.
    #[must_use]
    pub fn files(paths: &[PathBuf], filters: &FilterSet) -> Self {
        let mut candidates = Vec::with_capacity(paths.len());
        for path in paths {
            let metadata = match fs::metadata(path) {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => {
                    warn!(target: FLIST, path = %path.display(), "not a regular file, skipping");
                    continue;
                }
                Err(error) => {
                    warn!(target: FLIST, path = %path.display(), %error, "cannot read file, skipping");
                    continue;
                }
            };
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                warn!(target: FLIST, path = %path.display(), "file name is not valid UTF-8, skipping");
                continue;
            };
            if !filters.allows(Path::new(name)) {
                continue;
            }
            candidates.push(Candidate::new(
                Endpoint::Local(path.clone()),
                name,
                Some(metadata.len()),
            ));
        }
        Self {
            source: Source::Prepared(candidates.into_iter()),
        }
    }
}

impl Iterator for PathEnumerator {
    type Item = Result<Candidate, EnumerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Prepared(candidates) => candidates.next().map(Ok),
            Source::Local(walker) => loop {
                let entry = match walker.next()? {
                    Ok(entry) => entry,
                    Err(error) => return Some(Err(error.into())),
                };
                let Some(relative) = relative_key(entry.relative_path()) else {
                    warn!(
                        target: FLIST,
                        path = %entry.full_path().display(),
                        "path is not valid UTF-8, skipping"
                    );
                    continue;
                };
                let (full_path, _, size) = entry.into_parts();
                return Some(Ok(Candidate::new(
                    Endpoint::Local(full_path),
                    relative,
                    Some(size),
                )));
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            Source::Prepared(candidates) => candidates.size_hint(),
            Source::Local(_) => (0, None),
        }
    }
}

/// Converts a relative filesystem path into a `/`-separated key.
///
/// Returns `None` for paths with non-UTF-8 or non-normal components.
///
/// ```
/// use std::path::Path;
/// use engine::relative_key;
///
/// assert_eq!(relative_key(Path::new("a/b/c.txt")).as_deref(), Some("a/b/c.txt"));
/// assert_eq!(relative_key(Path::new("../c.txt")), None);
/// ```
#[must_use]
pub fn relative_key(path: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filters::FilterRule;
    use std::fs;

    fn txt_only() -> FilterSet {
        FilterSet::from_rules([FilterRule::include("*.txt")]).expect("filters")
    }

    fn keys(enumerator: PathEnumerator) -> Vec<String> {
        enumerator
            .map(|candidate| candidate.expect("candidate").relative().to_owned())
            .collect()
    }

    #[test]
    fn local_tree_applies_filters() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), b"a").expect("write");
        fs::write(dir.path().join("b.log"), b"b").expect("write");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        fs::write(dir.path().join("sub/c.txt"), b"c").expect("write");

        let enumerator =
            PathEnumerator::local(WalkBuilder::new(dir.path()).filters(txt_only())).expect("local");
        assert_eq!(keys(enumerator), ["a.txt", "sub/c.txt"]);
    }

    #[test]
    fn local_candidates_carry_size_and_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("data.bin"), [0_u8; 17]).expect("write");

        let candidate = PathEnumerator::local(WalkBuilder::new(dir.path()))
            .expect("local")
            .next()
            .expect("one")
            .expect("ok");
        assert_eq!(candidate.size(), Some(17));
        assert!(
            candidate
                .origin()
                .as_local()
                .expect("local")
                .ends_with("data.bin")
        );
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = PathEnumerator::local(WalkBuilder::new(dir.path().join("missing")))
            .expect_err("missing root");
        assert!(matches!(error, EnumerationError::Walk(_)));
    }

    #[test]
    fn explicit_files_skip_missing_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("present.txt");
        fs::write(&present, b"x").expect("write");
        let paths = vec![present, dir.path().join("absent.txt"), dir.path().to_path_buf()];

        let enumerator = PathEnumerator::files(&paths, &FilterSet::default());
        assert_eq!(keys(enumerator), ["present.txt"]);
    }

    #[test]
    fn explicit_files_apply_filters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("a.log");
        let txt = dir.path().join("b.txt");
        fs::write(&log, b"x").expect("write");
        fs::write(&txt, b"y").expect("write");

        let enumerator = PathEnumerator::files(&[log, txt], &txt_only());
        assert_eq!(keys(enumerator), ["b.txt"]);
    }

    #[test]
    fn relative_key_rejects_odd_components() {
        assert_eq!(relative_key(Path::new("")), None);
        assert_eq!(relative_key(Path::new("/abs/x")), None);
        assert_eq!(relative_key(Path::new("a/./b")).as_deref(), Some("a/b"));
    }
}
