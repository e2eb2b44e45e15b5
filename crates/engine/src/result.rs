use std::fmt;
use std::time::Duration;

use crate::{ErrorClass, TransferTask};

/// Terminal state of a task.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TaskOutcome {
    /// The file was transferred.
    Success,
    /// Every permitted attempt failed, or a permanent error occurred.
    Failed,
    /// The task was never attempted because the run was cancelled.
    Skipped,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        })
    }
}

/// Final error attached to a failed task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferError {
    class: ErrorClass,
    message: String,
    exit_status: Option<i32>,
}

impl TransferError {
    /// Creates an error of the given class.
    #[must_use]
    pub fn new(class: ErrorClass, message: impl Into<String>, exit_status: Option<i32>) -> Self {
        Self {
            class,
            message: message.into(),
            exit_status,
        }
    }

    /// Reclassifies an earlier failure as interrupted by cancellation,
    /// keeping its message and status.
    #[must_use]
    pub fn cancelled(self) -> Self {
        Self {
            class: ErrorClass::Cancelled,
            ..self
        }
    }

    /// Returns the failure class.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.class
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the primitive's exit status, when it exited normally.
    #[must_use]
    pub const fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.class)
    }
}

impl std::error::Error for TransferError {}

/// Terminal record for one task.
#[derive(Clone, Debug)]
pub struct TaskResult {
    task: TransferTask,
    outcome: TaskOutcome,
    error: Option<TransferError>,
    duration: Duration,
}

impl TaskResult {
    /// A transferred task.
    #[must_use]
    pub const fn success(task: TransferTask, duration: Duration) -> Self {
        Self {
            task,
            outcome: TaskOutcome::Success,
            error: None,
            duration,
        }
    }

    /// A task that ended with `error`.
    #[must_use]
    pub const fn failed(task: TransferTask, error: TransferError, duration: Duration) -> Self {
        Self {
            task,
            outcome: TaskOutcome::Failed,
            error: Some(error),
            duration,
        }
    }

    /// A task that was never attempted.
    #[must_use]
    pub const fn skipped(task: TransferTask) -> Self {
        Self {
            task,
            outcome: TaskOutcome::Skipped,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Returns the task, including its final attempt count.
    #[must_use]
    pub const fn task(&self) -> &TransferTask {
        &self.task
    }

    /// Returns the terminal outcome.
    #[must_use]
    pub const fn outcome(&self) -> TaskOutcome {
        self.outcome
    }

    /// Returns the final error for failed tasks.
    #[must_use]
    pub const fn error(&self) -> Option<&TransferError> {
        self.error.as_ref()
    }

    /// Wall time spent on the task, including backoff sleeps.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of primitive invocations made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.task.attempts()
    }

    /// Splits the result into its task and error.
    #[must_use]
    pub fn into_parts(self) -> (TransferTask, Option<TransferError>) {
        (self.task, self.error)
    }
}
