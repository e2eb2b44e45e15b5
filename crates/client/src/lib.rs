#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `client` wires the s3bulk pipeline together for front ends. A caller
//! describes the run with a [`TransferConfig`], hands it to [`run_transfer`]
//! (or [`run_with_aws`] for the production `aws` CLI backend) and receives an
//! [`engine::RunSummary`] whose [`HasExitCode`] implementation yields the
//! process exit status.
//!
//! # Design
//!
//! - [`config`] holds the validated run description and the optional TOML
//!   configuration file that supplies defaults.
//! - [`run`](mod@run) performs filter compilation, enumeration, planning and
//!   scheduling. It is generic over the transfer primitive and lister so tests
//!   drive it with in-memory fakes.
//! - [`signal`] connects SIGINT/SIGTERM to the run's
//!   [`engine::CancellationToken`].
//! - [`exit_code`] centralises the mapping from outcomes to exit statuses.
//!
//! # Errors
//!
//! Every fatal condition surfaces as a [`ClientError`], which always maps to
//! [`ExitCode::Setup`]. Per-file failures are reported through the summary.
//!
//! # Examples
//!
//! ```
//! use client::{HasExitCode, ExitCode, TransferConfig, TransferRequest, UploadSource, run_transfer};
//! use engine::RunContext;
//! use transport::DryRun;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
//!
//! let config = TransferConfig::builder(TransferRequest::Upload {
//!     source: UploadSource::Directory(dir.path().to_path_buf()),
//!     bucket: "bucket".into(),
//!     prefix: "backups".into(),
//! })
//! .build()
//! .unwrap();
//!
//! let summary = run_transfer(&config, DryRun, &DryRunLister, &RunContext::default()).unwrap();
//! assert_eq!(summary.succeeded, 1);
//! assert_eq!(summary.exit_code(), ExitCode::Ok);
//! # struct DryRunLister;
//! # impl transport::ObjectLister for DryRunLister {
//! #     fn list(&self, _: &str, _: &str) -> Result<Vec<transport::ListedObject>, transport::ListError> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//! ```
//!
//! # See also
//!
//! - `engine` for the pipeline components.
//! - `cli` for the argument parser that builds a [`TransferConfig`].

pub mod config;
mod error;
pub mod exit_code;
pub mod run;
pub mod signal;

pub use config::{
    ConfigFile, DEFAULT_TIMEOUT, DEFAULT_WORKERS, TransferConfig, TransferConfigBuilder,
    TransferRequest, UploadSource,
};
pub use error::ClientError;
pub use exit_code::{ExitCode, HasExitCode};
pub use run::{run_transfer, run_with_aws};
pub use signal::{SignalGuard, install_signal_handlers};
