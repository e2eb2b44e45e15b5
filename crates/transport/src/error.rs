use std::io;

use thiserror::Error;

/// Failure to produce a remote object listing.
#[derive(Debug, Error)]
pub enum ListError {
    /// The listing command could not be started.
    #[error("failed to start object listing: {source}")]
    Spawn {
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The listing command ran and reported an error.
    #[error("listing {uri} failed: {message}")]
    Failed {
        /// Location that was being listed.
        uri: String,
        /// Exit status of the listing command, when it exited normally.
        status: Option<i32>,
        /// Diagnostic text reported by the command.
        message: String,
    },
    /// The listing command exceeded its time limit and was killed.
    #[error("listing {uri} timed out")]
    TimedOut {
        /// Location that was being listed.
        uri: String,
    },
}
