//! Fatal error types for the engine crate.

use std::io;

use filters::FilterError;
use thiserror::Error;
use transport::{ListError, ObjectUriError};
use walk::WalkError;

use crate::SchedulerState;

/// Failure to produce the candidate set. Aborts the run before any transfer.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// A filter pattern did not compile.
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),
    /// The local source root or one of its directories could not be read.
    #[error(transparent)]
    Walk(#[from] WalkError),
    /// The bucket name is not usable.
    #[error(transparent)]
    Uri(#[from] ObjectUriError),
    /// The remote listing failed.
    #[error(transparent)]
    List(#[from] ListError),
}

/// Failure to set up or run the worker pool.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A worker thread could not be spawned.
    #[error("failed to spawn transfer worker: {source}")]
    WorkerSpawn {
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// [`crate::ConcurrencyScheduler::run`] was called on a scheduler that
    /// already left the idle state.
    #[error("scheduler already used (state: {state})")]
    AlreadyStarted {
        /// State the scheduler was in.
        state: SchedulerState,
    },
}
