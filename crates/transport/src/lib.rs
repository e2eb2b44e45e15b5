#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! # Overview
//!
//! `transport` is the boundary between s3bulk's orchestration engine and the
//! thing that actually moves bytes. The engine never talks to object storage
//! itself: every file is handed to a [`TransferPrimitive`], a blocking
//! `source -> destination` call that either succeeds or reports a failure
//! with an exit status and diagnostic text.
//!
//! # Design
//!
//! - [`Endpoint`] names one side of a transfer: a local path or an
//!   [`ObjectUri`] (`s3://bucket/key`).
//! - [`TransferPrimitive`] is the per-file call. [`AwsCli`] implements it by
//!   running `aws s3 cp`; [`DryRun`] logs what would happen and succeeds.
//! - [`ObjectLister`] produces the remote candidate set for downloads.
//!   [`AwsCli`] implements it with `aws s3 ls --recursive` and
//!   [`parse_listing_line`].
//! - [`AwsCliCommand`] assembles argument vectors so command construction can
//!   be tested without spawning processes.
//!
//! # Invariants
//!
//! - A primitive call never outlives its [`InvokeOptions::timeout`]; the child
//!   process is killed and the [`Invocation`] is flagged as timed out.
//! - Spawn failures surface as [`std::io::Error`]; a process that ran and
//!   failed is an `Ok(Invocation)` with a non-zero status.
//!
//! # Errors
//!
//! Listing failures are reported through [`ListError`]. Invalid `s3://`
//! strings produce [`ObjectUriError`].
//!
//! # Examples
//!
//! ```
//! use transport::{Endpoint, ObjectUri};
//!
//! let uri: ObjectUri = "s3://media/photos/2024/cat.jpg".parse().unwrap();
//! assert_eq!(uri.bucket(), "media");
//! assert_eq!(uri.key(), "photos/2024/cat.jpg");
//! assert_eq!(Endpoint::Remote(uri).to_string(), "s3://media/photos/2024/cat.jpg");
//! ```

mod aws;
mod dry_run;
mod endpoint;
mod error;
mod listing;
mod primitive;

pub use aws::{AwsCli, AwsCliCommand, DEFAULT_AWS_PROGRAM};
pub use dry_run::DryRun;
pub use endpoint::{Endpoint, ObjectUri, ObjectUriError, join_key};
pub use error::ListError;
pub use listing::{ListedObject, ObjectLister, parse_listing_line};
pub use primitive::{InvokeOptions, Invocation, TransferPrimitive};
