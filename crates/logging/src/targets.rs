//! Event targets shared across the workspace.
//!
//! Every target lives under the `s3bulk` prefix so a single directive such as
//! `s3bulk=debug` raises all of them at once while `RUST_LOG` can still
//! address one area, e.g. `s3bulk::retry=trace`.

/// Candidate enumeration and filtering.
pub const FLIST: &str = "s3bulk::flist";

/// Scheduler dispatch and worker lifecycle.
pub const SCHED: &str = "s3bulk::sched";

/// Retry decisions and backoff delays.
pub const RETRY: &str = "s3bulk::retry";

/// Per-task completion lines.
pub const PROGRESS: &str = "s3bulk::progress";

/// External command invocations.
pub const CMD: &str = "s3bulk::cmd";

/// Run setup, configuration and final summary.
pub const RUN: &str = "s3bulk::run";
