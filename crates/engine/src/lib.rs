#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` turns a candidate file set into finished transfers. It owns the
//! pipeline that sits between enumeration and reporting:
//!
//! ```text
//! PathEnumerator -> TaskBuilder -> ConcurrencyScheduler -> TransferExecutor -> ResultAggregator
//! ```
//!
//! # Design
//!
//! - [`PathEnumerator`] yields [`Candidate`]s from a local walk, a remote
//!   listing or an explicit file list. It is lazy and single pass.
//! - [`TaskBuilder`] maps candidates to [`TransferTask`]s. It is pure: the
//!   same candidate set always yields the same ids and destinations.
//! - [`TransferExecutor`] performs one task with bounded retries, using a
//!   [`Classifier`] to separate transient failures from permanent ones and a
//!   [`Sleeper`] for backoff so tests never sleep for real.
//! - [`ConcurrencyScheduler`] runs tasks on a fixed set of worker threads
//!   with at most `C` in flight, and stops dispatching once the
//!   [`CancellationToken`] in the [`RunContext`] is set.
//! - [`ResultAggregator`] collects exactly one [`TaskResult`] per task and
//!   produces the final [`RunSummary`].
//!
//! # Invariants
//!
//! - Every task built produces exactly one terminal [`TaskResult`]: tasks that
//!   are never dispatched because of cancellation are recorded as
//!   [`TaskOutcome::Skipped`].
//! - No more than `C` primitive invocations run at the same time.
//! - In-flight transfers are never interrupted by cancellation.
//!
//! # Errors
//!
//! [`EnumerationError`] aborts a run before scheduling. [`SchedulerError`]
//! reports worker pool setup failures. Per-task failures are data, carried by
//! [`TaskResult`], and never abort the run.
//!
//! # See also
//!
//! - `transport` for the primitives executed by [`TransferExecutor`].
//! - `client` for the orchestration facade that wires the pipeline together.

mod builder;
mod cancel;
mod classify;
mod enumerate;
mod error;
mod executor;
mod result;
mod retry;
mod scheduler;
mod summary;
mod task;

pub use builder::{Candidate, TaskBuilder, TaskPlan, is_safe_relative_key};
pub use cancel::{CancellationToken, RunContext};
pub use classify::{
    Classifier, DEFAULT_PERMANENT_MARKERS, DEFAULT_TRANSIENT_MARKERS, ErrorClass,
};
pub use enumerate::{PathEnumerator, relative_key};
pub use error::{EnumerationError, SchedulerError};
pub use executor::{Execute, TransferExecutor};
pub use result::{TaskOutcome, TaskResult, TransferError};
pub use retry::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, RetryPolicy, Sleeper,
    ThreadSleeper, backoff_delay,
};
pub use scheduler::{ConcurrencyScheduler, SchedulerState};
pub use summary::{FailedTask, ResultAggregator, RunSummary};
pub use task::{Direction, TaskId, TransferTask};
