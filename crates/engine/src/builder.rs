//! Candidate to task mapping.
//!
//! [`TaskBuilder`] is pure: it never touches the filesystem or the network.
//! Candidates are sorted by relative key and deduplicated before ids are
//! assigned, so the same candidate set always yields the same plan no matter
//! what order the enumerator produced it in.

use std::path::{Path, PathBuf};

use logging::targets::FLIST;
use tracing::{debug, warn};
use transport::{Endpoint, ObjectUri, ObjectUriError, join_key};

use crate::{Direction, TaskId, TransferTask};

/// One enumerated item, not yet bound to a destination.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    origin: Endpoint,
    relative: String,
    size: Option<u64>,
}

impl Candidate {
    /// Creates a candidate read from `origin`.
    #[must_use]
    pub fn new(origin: Endpoint, relative: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            origin,
            relative: relative.into(),
            size,
        }
    }

    /// Returns where the item is read from.
    #[must_use]
    pub const fn origin(&self) -> &Endpoint {
        &self.origin
    }

    /// Returns the `/`-separated key relative to the enumeration root.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Returns the size reported by the enumerator.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Target {
    Bucket { bucket: String, prefix: String },
    Directory(PathBuf),
}

/// Maps candidates to [`TransferTask`]s with a fixed destination layout.
///
/// Uploads land at `prefix/relative` in the bucket; downloads land at
/// `root/relative` on disk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskBuilder {
    target: Target,
}

impl TaskBuilder {
    /// Builder for uploads into `bucket` under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectUriError::InvalidBucket`] when `bucket` is empty or
    /// contains `/`.
    pub fn upload(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self, ObjectUriError> {
        let bucket = bucket.into();
        ObjectUri::new(bucket.clone(), String::new())?;
        Ok(Self {
            target: Target::Bucket {
                bucket,
                prefix: prefix.into().trim_matches('/').to_owned(),
            },
        })
    }

    /// Builder for downloads into the local directory `root`.
    #[must_use]
    pub fn download(root: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::Directory(root.into()),
        }
    }

    /// Returns the transfer direction implied by the destination.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.target {
            Target::Bucket { .. } => Direction::Upload,
            Target::Directory(_) => Direction::Download,
        }
    }

    /// Computes the destination for a relative key.
    ///
    /// Returns `None` when the key is unsafe (see [`is_safe_relative_key`]).
    #[must_use]
    pub fn destination_for(&self, relative: &str) -> Option<Endpoint> {
        if !is_safe_relative_key(relative) {
            return None;
        }
        match &self.target {
            Target::Bucket { bucket, prefix } => {
                let key = join_key(prefix, relative);
                ObjectUri::new(bucket.clone(), key).ok().map(Endpoint::Remote)
            }
            Target::Directory(root) => Some(Endpoint::Local(local_destination(root, relative))),
        }
    }

    /// Turns candidates into an ordered plan.
    pub fn build<I>(&self, candidates: I) -> TaskPlan
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut candidates: Vec<Candidate> = candidates.into_iter().collect();
        candidates.sort_by(|a, b| {
            a.relative
                .cmp(&b.relative)
                .then_with(|| a.origin.to_string().cmp(&b.origin.to_string()))
        });

        let mut plan = TaskPlan::default();
        let mut previous: Option<String> = None;
        for candidate in candidates {
            if previous.as_deref() == Some(candidate.relative.as_str()) {
                debug!(target: FLIST, key = %candidate.relative, "dropping duplicate candidate");
                plan.duplicates.push(candidate);
                continue;
            }
            previous = Some(candidate.relative.clone());

            let Some(destination) = self.destination_for(&candidate.relative) else {
                warn!(target: FLIST, key = %candidate.relative, "skipping unsafe relative key");
                plan.rejected.push(candidate);
                continue;
            };
            let id = TaskId::new(plan.tasks.len() as u64);
            plan.tasks.push(TransferTask::new(
                id,
                candidate.origin,
                destination,
                candidate.relative,
                candidate.size,
            ));
        }
        plan
    }
}

/// Output of [`TaskBuilder::build`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TaskPlan {
    /// Tasks ordered by relative key, with ids `0..len`.
    pub tasks: Vec<TransferTask>,
    /// Candidates dropped because an earlier one had the same relative key.
    pub duplicates: Vec<Candidate>,
    /// Candidates whose relative key could not be mapped safely.
    pub rejected: Vec<Candidate>,
}

impl TaskPlan {
    /// Total bytes across tasks with a known size.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.tasks.iter().filter_map(TransferTask::size).sum()
    }
}

/// Returns `true` when `key` can be joined onto a destination root without
/// escaping it.
///
/// Safe keys are non-empty, do not start or end with `/`, and contain no
/// empty, `.` or `..` segments.
///
/// ```
/// use engine::is_safe_relative_key;
///
/// assert!(is_safe_relative_key("photos/2024/a.jpg"));
/// assert!(!is_safe_relative_key("../etc/passwd"));
/// assert!(!is_safe_relative_key("a//b"));
/// ```
#[must_use]
pub fn is_safe_relative_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

fn local_destination(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(relative: &str) -> Candidate {
        Candidate::new(
            Endpoint::Local(PathBuf::from("/src").join(relative)),
            relative,
            Some(relative.len() as u64),
        )
    }

    fn destinations(plan: &TaskPlan) -> Vec<String> {
        plan.tasks
            .iter()
            .map(|task| task.destination().to_string())
            .collect()
    }

    #[test]
    fn upload_joins_prefix_and_key() {
        let builder = TaskBuilder::upload("bucket", "backups/").expect("builder");
        let plan = builder.build([local("a.txt"), local("sub/c.txt")]);
        assert_eq!(
            destinations(&plan),
            ["s3://bucket/backups/a.txt", "s3://bucket/backups/sub/c.txt"]
        );
        assert_eq!(builder.direction(), Direction::Upload);
    }

    #[test]
    fn empty_prefix_uses_relative_key() {
        let builder = TaskBuilder::upload("bucket", "").expect("builder");
        let plan = builder.build([local("a.txt")]);
        assert_eq!(destinations(&plan), ["s3://bucket/a.txt"]);
    }

    #[test]
    fn invalid_bucket_is_rejected() {
        assert!(TaskBuilder::upload("", "p").is_err());
        assert!(TaskBuilder::upload("a/b", "p").is_err());
    }

    #[test]
    fn download_preserves_structure() {
        let builder = TaskBuilder::download("/out");
        let candidate = Candidate::new(
            Endpoint::Remote("s3://bucket/p/sub/c.txt".parse().expect("uri")),
            "sub/c.txt",
            Some(9),
        );
        let plan = builder.build([candidate]);
        let task = &plan.tasks[0];
        assert_eq!(
            task.destination().as_local(),
            Some(Path::new("/out/sub/c.txt"))
        );
        assert_eq!(builder.direction(), Direction::Download);
    }

    #[test]
    fn ids_follow_sorted_keys() {
        let builder = TaskBuilder::upload("bucket", "").expect("builder");
        let plan = builder.build([local("z.txt"), local("a.txt"), local("m/b.txt")]);
        let keys: Vec<_> = plan
            .tasks
            .iter()
            .map(|task| (task.id().get(), task.relative().to_owned()))
            .collect();
        assert_eq!(
            keys,
            [
                (0, "a.txt".to_owned()),
                (1, "m/b.txt".to_owned()),
                (2, "z.txt".to_owned())
            ]
        );
    }

    #[test]
    fn duplicates_are_removed() {
        let builder = TaskBuilder::upload("bucket", "").expect("builder");
        let other = Candidate::new(Endpoint::Local(PathBuf::from("/other/a.txt")), "a.txt", None);
        let plan = builder.build([local("a.txt"), other, local("b.txt")]);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.duplicates.len(), 1);
        assert_eq!(
            plan.tasks[0].source().as_local(),
            Some(Path::new("/other/a.txt"))
        );
    }

    #[test]
    fn unsafe_keys_are_rejected() {
        let builder = TaskBuilder::download("/out");
        let plan = builder.build([local("../escape"), local("ok.txt"), local("a/./b")]);
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.rejected.len(), 2);
        assert_eq!(plan.tasks[0].id().get(), 0);
    }

    #[test]
    fn safe_key_rules() {
        assert!(is_safe_relative_key("a"));
        assert!(is_safe_relative_key("a b/c d.txt"));
        assert!(is_safe_relative_key("..hidden"));
        assert!(!is_safe_relative_key(""));
        assert!(!is_safe_relative_key("/abs"));
        assert!(!is_safe_relative_key("dir/"));
        assert!(!is_safe_relative_key("a/../b"));
        assert!(!is_safe_relative_key("."));
    }

    #[test]
    fn total_bytes_counts_known_sizes() {
        let builder = TaskBuilder::upload("bucket", "").expect("builder");
        let unknown = Candidate::new(Endpoint::Local(PathBuf::from("/src/x")), "x", None);
        let plan = builder.build([local("ab"), local("cde"), unknown]);
        assert_eq!(plan.total_bytes(), 5);
    }
}
