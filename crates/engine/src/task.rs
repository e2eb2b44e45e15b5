use std::fmt;

use transport::Endpoint;

/// Stable identifier assigned by [`crate::TaskBuilder`].
///
/// Ids follow the sorted order of relative keys, so they are reproducible
/// for the same candidate set.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which way files move.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Local files to a bucket.
    Upload,
    /// Bucket objects to local files.
    Download,
}

impl Direction {
    /// Past-tense verb used in progress lines.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Upload => "uploaded",
            Self::Download => "downloaded",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Download => "download",
        })
    }
}

/// One file to move.
///
/// Everything except the attempt counter is fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferTask {
    id: TaskId,
    source: Endpoint,
    destination: Endpoint,
    relative: String,
    size: Option<u64>,
    attempts: u32,
}

impl TransferTask {
    /// Creates a task that has not been attempted yet.
    #[must_use]
    pub fn new(
        id: TaskId,
        source: Endpoint,
        destination: Endpoint,
        relative: impl Into<String>,
        size: Option<u64>,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            relative: relative.into(),
            size,
            attempts: 0,
        }
    }

    /// Returns the task id.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns where the file is read from.
    #[must_use]
    pub const fn source(&self) -> &Endpoint {
        &self.source
    }

    /// Returns where the file is written to.
    #[must_use]
    pub const fn destination(&self) -> &Endpoint {
        &self.destination
    }

    /// Returns the `/`-separated key relative to the transfer root.
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Returns the size in bytes, when known before the transfer.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns how many times the primitive has been invoked for this task.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Counts a new attempt and returns its 1-based number.
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn task() -> TransferTask {
        TransferTask::new(
            TaskId::new(7),
            Endpoint::Local(PathBuf::from("/data/a.txt")),
            Endpoint::Remote("s3://b/p/a.txt".parse().expect("uri")),
            "a.txt",
            Some(3),
        )
    }

    #[test]
    fn new_task_has_no_attempts() {
        let task = task();
        assert_eq!(task.attempts(), 0);
        assert_eq!(task.id().to_string(), "#7");
        assert_eq!(task.relative(), "a.txt");
        assert_eq!(task.size(), Some(3));
    }

    #[test]
    fn record_attempt_counts_from_one() {
        let mut task = task();
        assert_eq!(task.record_attempt(), 1);
        assert_eq!(task.record_attempt(), 2);
        assert_eq!(task.attempts(), 2);
    }

    #[test]
    fn direction_words() {
        assert_eq!(Direction::Upload.to_string(), "upload");
        assert_eq!(Direction::Download.verb(), "downloaded");
    }
}
