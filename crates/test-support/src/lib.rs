#![deny(unsafe_code)]

//! Fakes and fixtures shared by the workspace's integration tests.
//!
//! - [`ScriptedTransport`] replays per-file outcomes and measures how many
//!   calls overlap.
//! - [`FakeLister`] serves a fixed object listing.
//! - [`RecordingSleeper`] records backoff delays without sleeping.
//! - [`FileTree`] writes small directory trees into a temporary directory.
//! - [`fake_aws`] writes a shell script that stands in for the `aws` CLI.

mod lister;
mod scripted;
mod sleeper;
mod tree;

pub use lister::FakeLister;
pub use scripted::{Call, ScriptedTransport, Step};
pub use sleeper::RecordingSleeper;
pub use tree::FileTree;
#[cfg(unix)]
pub use tree::{FAKE_AWS_SCRIPT, fake_aws};
