#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front end of `s3bulk`. It parses the `upload`
//! and `download` subcommands, layers an optional TOML configuration file
//! under the explicit options, configures logging and signal handling, and
//! hands the resulting [`client::TransferConfig`] to
//! [`client::run_with_aws`].
//!
//! # Design
//!
//! [`run`] accepts an iterator of arguments together with handles for
//! standard output and error so the binary and the tests drive exactly the
//! same code. Parsing uses a [`clap`] builder definition; the end-of-run
//! report is written to the supplied standard output and diagnostics to the
//! supplied standard error. Progress logging goes through `tracing` and is
//! written to the process's standard error by the subscriber installed by
//! [`logging::init_tracing`].
//!
//! # Invariants
//!
//! - `run` never panics; failures surface as exit codes.
//! - Help and version requests exit `0`; usage errors exit `2`.
//! - A finished run exits `0` only when every file succeeded; any failure or
//!   a cancelled run exits `1`; setup errors exit `2`.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = cli::run(["s3bulk", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("s3bulk "));
//! ```
//!
//! # See also
//!
//! - [`client::exit_code`] for the exit status table.
//! - `src/bin/s3bulk.rs` for the binary that wires [`run`] into `main`.

use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};

use clap::error::ErrorKind;
use client::{ExitCode, HasExitCode, install_signal_handlers, run_with_aws};
use engine::RunContext;
use logging::{VerbosityConfig, init_tracing};

mod args;
mod command;
mod render;

use args::{ParsedArgs, parse_args};
use render::render_summary;

/// Name used in usage text and diagnostics.
pub const PROGRAM_NAME: &str = "s3bulk";

/// Runs the CLI using the provided argument iterator and output handles.
///
/// The function returns the process exit code that should be used by the
/// caller.
#[allow(clippy::module_name_repetitions)]
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => report_parse_error(&error, stdout, stderr),
    }
}

/// Converts a status returned by [`run`] into a process exit code.
///
/// Values outside `0..=255` are clamped to `u8::MAX`.
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    std::process::ExitCode::from(u8::try_from(status).unwrap_or(u8::MAX))
}

fn report_parse_error<Out, Err>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let rendered = error.render().to_string();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if stdout.write_all(rendered.as_bytes()).is_err() {
                return ExitCode::PartialTransfer.as_i32();
            }
            ExitCode::Ok.as_i32()
        }
        _ => {
            let _ = stderr.write_all(rendered.as_bytes());
            ExitCode::Setup.as_i32()
        }
    }
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    let verbosity = VerbosityConfig::from_flags(parsed.quiet, parsed.verbose)
        .with_ansi(io::stderr().is_terminal());
    init_tracing(&verbosity);

    let config = match parsed.into_config() {
        Ok(config) => config,
        Err(error) => return report_error(&error, stderr),
    };

    let context = RunContext::default();
    let _signals = match install_signal_handlers(context.cancellation()) {
        Ok(guard) => guard,
        Err(error) => return report_error(&error, stderr),
    };

    match run_with_aws(&config, &context) {
        Ok(summary) => {
            if render_summary(&summary, stdout).is_err() {
                let _ = writeln!(stderr, "{PROGRAM_NAME}: failed to write summary");
            }
            summary.exit_code().as_i32()
        }
        Err(error) => report_error(&error, stderr),
    }
}

fn report_error<E, Err>(error: &E, stderr: &mut Err) -> i32
where
    E: std::error::Error + HasExitCode,
    Err: Write,
{
    let _ = writeln!(stderr, "{PROGRAM_NAME}: error: {error}");
    error.exit_code().as_i32()
}
