//! Bounded parallel dispatch.
//!
//! # Design
//!
//! The calling thread is the dispatcher. It acquires a slot from a counting
//! semaphore before pulling each task, then hands the task and its
//! [`SlotGuard`] to a fixed pool of scoped worker threads over a
//! `crossbeam-channel` queue. Workers release the slot only after the result
//! has been recorded, so the number of tasks between dispatch and record
//! never exceeds the configured concurrency, whatever the pool size.
//!
//! # Invariants
//!
//! - Every task pulled from the input produces exactly one recorded result.
//! - No task is dispatched after cancellation has been observed.
//! - In-flight tasks are never interrupted; the run drains before returning.

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::SendError;
use logging::targets::SCHED;
use tracing::{debug, info, trace};

use crate::{
    CancellationToken, Execute, ResultAggregator, RunContext, SchedulerError, TaskResult,
    TransferTask,
};

const SLOT_POLL: Duration = Duration::from_millis(50);

/// Lifecycle of a [`ConcurrencyScheduler`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SchedulerState {
    /// Created, not yet run.
    Idle,
    /// Dispatching tasks.
    Running,
    /// Every task was dispatched and finished.
    Completed,
    /// Cancellation stopped dispatch; undispatched tasks were skipped.
    Cancelled,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Runs tasks through an [`Execute`] implementation with at most `C` in
/// flight.
///
/// A scheduler is single-use: [`run`](Self::run) may only be called once.
#[derive(Debug)]
pub struct ConcurrencyScheduler {
    concurrency: usize,
    state: SchedulerState,
    peak_in_flight: usize,
}

impl ConcurrencyScheduler {
    /// Creates an idle scheduler. A concurrency of zero is raised to one.
    #[must_use]
    pub const fn new(concurrency: usize) -> Self {
        Self {
            concurrency: if concurrency == 0 { 1 } else { concurrency },
            state: SchedulerState::Idle,
            peak_in_flight: 0,
        }
    }

    /// Returns the in-flight bound.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Highest number of tasks observed in flight during the run.
    #[must_use]
    pub const fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    /// Dispatches every task and blocks until all have been recorded.
    ///
    /// Returns [`SchedulerState::Completed`] or [`SchedulerState::Cancelled`].
    /// A cancellation observed once every task has been dispatched still
    /// yields `Completed`, since no task was skipped.
    ///
    /// # Errors
    ///
    /// Fails if the scheduler has already been used or a worker thread cannot
    /// be spawned.
    pub fn run<I, E>(
        &mut self,
        tasks: I,
        context: &RunContext,
        executor: &E,
        aggregator: &ResultAggregator,
    ) -> Result<SchedulerState, SchedulerError>
    where
        I: IntoIterator<Item = TransferTask>,
        E: Execute,
    {
        if self.state != SchedulerState::Idle {
            return Err(SchedulerError::AlreadyStarted { state: self.state });
        }

        let mut tasks = tasks.into_iter().peekable();
        if tasks.peek().is_none() {
            debug!(target: SCHED, "no tasks to schedule");
            self.state = SchedulerState::Completed;
            return Ok(self.state);
        }
        if context.is_cancelled() {
            let skipped = skip_remaining(&mut tasks, aggregator);
            info!(target: SCHED, skipped, "cancelled before dispatch");
            self.state = SchedulerState::Cancelled;
            return Ok(self.state);
        }

        let workers = match tasks.size_hint() {
            (_, Some(upper)) => upper.min(self.concurrency),
            (_, None) => self.concurrency,
        }
        .max(1);
        self.state = SchedulerState::Running;
        debug!(target: SCHED, workers, concurrency = self.concurrency, "starting workers");

        let slots = Slots::new(self.concurrency);
        let outcome = thread::scope(|scope| -> Result<bool, SchedulerError> {
            let (sender, receiver) = crossbeam_channel::bounded(workers);

            for index in 0..workers {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("s3bulk-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        while let Ok((task, slot)) = receiver.recv() {
                            let result = executor.execute(task, context);
                            aggregator.record(result);
                            drop(slot);
                        }
                    })
                    .map_err(|source| SchedulerError::WorkerSpawn { source })?;
            }
            drop(receiver);

            let mut cancelled = false;
            // Cancellation only matters while undispatched tasks remain.
            while tasks.peek().is_some() {
                let Some(slot) = slots.acquire(context.cancellation()) else {
                    cancelled = true;
                    break;
                };
                if context.is_cancelled() {
                    cancelled = true;
                    break;
                }
                let Some(task) = tasks.next() else {
                    break;
                };
                trace!(target: SCHED, task = %task.id(), key = task.relative(), "dispatching");
                if let Err(SendError((task, _slot))) = sender.send((task, slot)) {
                    aggregator.record(TaskResult::skipped(task));
                    break;
                }
            }
            drop(sender);

            let skipped = skip_remaining(&mut tasks, aggregator);
            if cancelled {
                info!(target: SCHED, skipped, "cancellation observed, draining in-flight transfers");
            }
            Ok(cancelled)
        });

        self.peak_in_flight = slots.peak();
        aggregator.observe_in_flight(self.peak_in_flight);

        self.state = if outcome? {
            SchedulerState::Cancelled
        } else {
            SchedulerState::Completed
        };
        debug!(target: SCHED, state = %self.state, peak = self.peak_in_flight, "scheduler finished");
        Ok(self.state)
    }
}

fn skip_remaining<I>(tasks: &mut I, aggregator: &ResultAggregator) -> usize
where
    I: Iterator<Item = TransferTask>,
{
    let mut skipped = 0;
    for task in tasks {
        if aggregator.record(TaskResult::skipped(task)) {
            skipped += 1;
        }
    }
    skipped
}

#[derive(Debug, Default)]
struct SlotCounts {
    in_use: usize,
    peak: usize,
}

/// Counting semaphore that also tracks its high-water mark.
#[derive(Debug)]
struct Slots {
    capacity: usize,
    counts: Mutex<SlotCounts>,
    freed: Condvar,
}

impl Slots {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            counts: Mutex::new(SlotCounts::default()),
            freed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotCounts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until a slot is free. Returns `None` if cancellation is
    /// requested while waiting.
    fn acquire(&self, cancellation: &CancellationToken) -> Option<SlotGuard<'_>> {
        let mut counts = self.lock();
        while counts.in_use >= self.capacity {
            if cancellation.is_cancelled() {
                return None;
            }
            counts = self
                .freed
                .wait_timeout(counts, SLOT_POLL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        counts.in_use += 1;
        counts.peak = counts.peak.max(counts.in_use);
        Some(SlotGuard { slots: self })
    }

    fn peak(&self) -> usize {
        self.lock().peak
    }
}

/// Held for as long as a task occupies an in-flight slot.
struct SlotGuard<'a> {
    slots: &'a Slots,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut counts = self.slots.lock();
        counts.in_use = counts.in_use.saturating_sub(1);
        drop(counts);
        self.slots.freed.notify_one();
    }
}
