//! Adapters backed by the `aws` command line tool.

mod command;
mod process;

use std::ffi::OsString;
use std::fs;
use std::io;
use std::time::Duration;

use logging::targets::CMD;
use tracing::{debug, trace};

pub use command::{AwsCliCommand, DEFAULT_AWS_PROGRAM};

use crate::{
    Endpoint, InvokeOptions, Invocation, ListError, ListedObject, ObjectLister, ObjectUri,
    TransferPrimitive, parse_listing_line,
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const LIST_TIMEOUT: Duration = Duration::from_secs(1800);

/// Transfer primitive and lister that shell out to `aws s3`.
#[derive(Clone, Debug)]
pub struct AwsCli {
    program: OsString,
    profile: Option<String>,
    list_timeout: Option<Duration>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsCli {
    /// Uses the `aws` binary found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: OsString::from(DEFAULT_AWS_PROGRAM),
            profile: None,
            list_timeout: Some(LIST_TIMEOUT),
        }
    }

    /// Uses a specific `aws` executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Passes `--profile NAME` to every invocation.
    #[must_use]
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile.filter(|name| !name.is_empty());
        self
    }

    /// Bounds how long a remote listing may take. `None` waits indefinitely.
    #[must_use]
    pub const fn with_list_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.list_timeout = timeout;
        self
    }

    /// Returns the configured executable.
    #[must_use]
    pub fn program(&self) -> &std::ffi::OsStr {
        &self.program
    }

    /// Verifies the CLI is installed by running `aws --version`.
    ///
    /// Returns the reported version string.
    pub fn probe(&self) -> io::Result<String> {
        let command = AwsCliCommand::version(self.program.clone());
        trace!(target: CMD, command = ?command.command_parts_for_testing(), "probing aws cli");
        let invocation = process::run(command.into_command(), Some(PROBE_TIMEOUT))?;
        if invocation.succeeded() {
            let version = if invocation.stdout.trim().is_empty() {
                invocation.stderr.trim()
            } else {
                invocation.stdout.trim()
            };
            debug!(target: CMD, version, "aws cli detected");
            Ok(version.to_owned())
        } else {
            Err(io::Error::other(format!(
                "'{} --version' failed: {}",
                self.program.to_string_lossy(),
                invocation.diagnostic()
            )))
        }
    }

    fn command(&self, mut command: AwsCliCommand) -> AwsCliCommand {
        command.set_profile(self.profile.clone());
        command
    }
}

impl TransferPrimitive for AwsCli {
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        options: &InvokeOptions,
    ) -> io::Result<Invocation> {
        if let Some(parent) = destination.as_local().and_then(std::path::Path::parent) {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let command = self.command(AwsCliCommand::copy(
            self.program.clone(),
            source,
            destination,
        ));
        trace!(target: CMD, command = ?command.command_parts_for_testing(), "spawning transfer");
        process::run(command.into_command(), options.timeout())
    }
}

impl ObjectLister for AwsCli {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ListError> {
        let uri = ObjectUri::listing(bucket, prefix);
        let command = self.command(AwsCliCommand::list(self.program.clone(), bucket, prefix));
        debug!(target: CMD, %uri, "listing remote objects");

        let invocation = process::run(command.into_command(), self.list_timeout)
            .map_err(|source| ListError::Spawn { source })?;

        if invocation.timed_out {
            return Err(ListError::TimedOut { uri });
        }
        if !invocation.succeeded() {
            // `aws s3 ls` exits 1 without output when nothing matches the prefix.
            let silent = invocation.stdout.trim().is_empty() && invocation.stderr.trim().is_empty();
            if invocation.status == Some(1) && silent {
                return Ok(Vec::new());
            }
            return Err(ListError::Failed {
                uri,
                status: invocation.status,
                message: invocation.diagnostic(),
            });
        }

        let objects: Vec<_> = invocation
            .stdout
            .lines()
            .filter_map(parse_listing_line)
            .collect();
        debug!(target: CMD, %uri, count = objects.len(), "listing complete");
        Ok(objects)
    }
}
