#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the diagnostic output of s3bulk. Library crates emit
//! [`tracing`] events against the fixed targets exported from [`targets`];
//! the binary calls [`init_tracing`] once with a [`VerbosityConfig`] derived
//! from `-q`/`-v` flags.
//!
//! # Design
//!
//! - [`Verbosity`] is the user-facing level ladder (quiet, normal, verbose,
//!   trace). [`VerbosityConfig::directive`] renders it as an
//!   [`tracing_subscriber::EnvFilter`] directive.
//! - `RUST_LOG`, when set, replaces the computed directive entirely.
//! - Output goes to stderr so stdout stays reserved for the run summary.
//!
//! # Examples
//!
//! ```
//! use logging::{Verbosity, VerbosityConfig};
//!
//! let config = VerbosityConfig::from_flags(false, 1);
//! assert_eq!(config.verbosity(), Verbosity::Verbose);
//! assert_eq!(config.directive(), "warn,s3bulk=debug");
//! ```

mod config;
pub mod targets;
mod tracing_bridge;

pub use config::{Verbosity, VerbosityConfig};
pub use tracing_bridge::{build_filter, init_tracing};
