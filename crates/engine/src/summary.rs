//! Thread-safe result accumulation and the final run report.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use logging::targets::PROGRESS;
use tracing::{debug, info, warn};
use transport::Endpoint;

use crate::{Direction, TaskId, TaskOutcome, TaskResult, TransferError};

/// A task that ended in [`TaskOutcome::Failed`], kept for the final report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailedTask {
    /// Task id.
    pub id: TaskId,
    /// Relative key of the task.
    pub relative: String,
    /// Where the file was read from.
    pub source: Endpoint,
    /// Where the file was to be written.
    pub destination: Endpoint,
    /// Attempts made before giving up.
    pub attempts: u32,
    /// Final error.
    pub error: TransferError,
}

/// Aggregate outcome of one run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Direction of the run.
    pub direction: Direction,
    /// Number of tasks planned.
    pub total: usize,
    /// Tasks that transferred successfully.
    pub succeeded: usize,
    /// Tasks that failed.
    pub failed: usize,
    /// Tasks skipped because of cancellation.
    pub skipped: usize,
    /// Candidates left out of the plan because their key could not be
    /// mapped to a destination safely.
    pub rejected: usize,
    /// Tasks that needed more than one attempt, whatever their outcome.
    pub retried: usize,
    /// Primitive invocations across all tasks.
    pub attempts: u64,
    /// Bytes moved by successful tasks of known size.
    pub bytes_transferred: u64,
    /// Highest number of tasks in flight at once.
    pub peak_in_flight: usize,
    /// Wall time from aggregator creation to finalisation.
    pub elapsed: Duration,
    /// Whether the run was cancelled before completion.
    pub cancelled: bool,
    /// Failed tasks ordered by id.
    pub failures: Vec<FailedTask>,
}

impl RunSummary {
    /// Returns `true` when nothing failed or was rejected and the run was
    /// not cancelled.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && self.rejected == 0 && !self.cancelled
    }

    /// Mean wall time per successful file, if any succeeded.
    #[must_use]
    pub fn average_per_file(&self) -> Option<Duration> {
        let count = u32::try_from(self.succeeded).ok().filter(|count| *count > 0)?;
        Some(self.elapsed / count)
    }
}

#[derive(Debug, Default)]
struct Tally {
    seen: HashSet<TaskId>,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    rejected: usize,
    retried: usize,
    attempts: u64,
    bytes: u64,
    peak: usize,
    failures: Vec<FailedTask>,
}

/// Collects [`TaskResult`]s from many workers.
///
/// Recording is idempotent per task id: a second result for the same task is
/// ignored, so counts always match the number of distinct tasks.
#[derive(Debug)]
pub struct ResultAggregator {
    total: usize,
    direction: Direction,
    started: Instant,
    tally: Mutex<Tally>,
}

impl ResultAggregator {
    /// Creates an aggregator expecting `total` results.
    #[must_use]
    pub fn new(total: usize, direction: Direction) -> Self {
        Self {
            total,
            direction,
            started: Instant::now(),
            tally: Mutex::new(Tally::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a terminal result and logs a progress line.
    ///
    /// Returns `false` if a result for the same task was already recorded.
    pub fn record(&self, result: TaskResult) -> bool {
        let mut tally = self.lock();
        let task = result.task();
        if !tally.seen.insert(task.id()) {
            debug!(target: PROGRESS, task = %task.id(), "duplicate result ignored");
            return false;
        }

        tally.attempts += u64::from(result.attempts());
        if result.attempts() > 1 {
            tally.retried += 1;
        }
        let percent = percent(tally.seen.len(), self.total);

        match result.outcome() {
            TaskOutcome::Success => {
                tally.succeeded += 1;
                tally.bytes += task.size().unwrap_or(0);
                info!(
                    target: PROGRESS,
                    "[{percent:>5.1}%] {} {} -> {}",
                    self.direction.verb(),
                    task.relative(),
                    task.destination()
                );
            }
            TaskOutcome::Failed => {
                tally.failed += 1;
                let attempts = result.attempts();
                let (task, error) = result.into_parts();
                let Some(error) = error else {
                    return true;
                };
                warn!(
                    target: PROGRESS,
                    "[{percent:>5.1}%] failed {} after {attempts} attempt(s): {error}",
                    task.relative()
                );
                tally.failures.push(FailedTask {
                    id: task.id(),
                    relative: task.relative().to_owned(),
                    source: task.source().clone(),
                    destination: task.destination().clone(),
                    attempts,
                    error,
                });
            }
            TaskOutcome::Skipped => {
                tally.skipped += 1;
                debug!(target: PROGRESS, "[{percent:>5.1}%] skipped {}", task.relative());
            }
        }
        true
    }

    /// Notes the scheduler's in-flight high-water mark.
    pub fn observe_in_flight(&self, peak: usize) {
        let mut tally = self.lock();
        tally.peak = tally.peak.max(peak);
    }

    /// Notes candidates the planner refused to turn into tasks.
    pub fn observe_rejected(&self, count: usize) {
        self.lock().rejected += count;
    }

    /// Number of distinct results recorded so far.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.lock().seen.len()
    }

    /// Number of results the aggregator expects.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Consumes the aggregator and produces the run summary.
    #[must_use]
    pub fn finalize(self, cancelled: bool) -> RunSummary {
        let elapsed = self.started.elapsed();
        let mut tally = self.tally.into_inner().unwrap_or_else(PoisonError::into_inner);
        tally.failures.sort_by_key(|failure| failure.id);
        RunSummary {
            direction: self.direction,
            total: self.total.max(tally.seen.len()),
            succeeded: tally.succeeded,
            failed: tally.failed,
            skipped: tally.skipped,
            rejected: tally.rejected,
            retried: tally.retried,
            attempts: tally.attempts,
            bytes_transferred: tally.bytes,
            peak_in_flight: tally.peak,
            elapsed,
            cancelled,
            failures: tally.failures,
        }
    }
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}
