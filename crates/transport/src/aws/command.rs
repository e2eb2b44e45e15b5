use std::ffi::OsString;
use std::process::Command;

use crate::{Endpoint, ObjectUri};

/// Program name used when no explicit `aws` binary is configured.
pub const DEFAULT_AWS_PROGRAM: &str = "aws";

/// Builder for an `aws` command line.
///
/// ```
/// use transport::{AwsCliCommand, Endpoint};
/// use std::path::PathBuf;
///
/// let mut command = AwsCliCommand::copy(
///     "aws",
///     &Endpoint::Local(PathBuf::from("report.csv")),
///     &Endpoint::Remote("s3://bucket/daily/report.csv".parse().unwrap()),
/// );
/// command.set_profile(Some("prod"));
/// let (_, args) = command.command_parts_for_testing();
/// assert_eq!(
///     args,
///     ["s3", "cp", "report.csv", "s3://bucket/daily/report.csv", "--profile", "prod"]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct AwsCliCommand {
    program: OsString,
    args: Vec<OsString>,
    profile: Option<String>,
}

impl AwsCliCommand {
    /// Creates a command that runs `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            profile: None,
        }
    }

    /// `aws --version`.
    #[must_use]
    pub fn version(program: impl Into<OsString>) -> Self {
        let mut command = Self::new(program);
        command.push_arg("--version");
        command
    }

    /// `aws s3 cp SOURCE DESTINATION`.
    #[must_use]
    pub fn copy(program: impl Into<OsString>, source: &Endpoint, destination: &Endpoint) -> Self {
        let mut command = Self::new(program);
        command.push_arg("s3");
        command.push_arg("cp");
        command.push_arg(endpoint_arg(source));
        command.push_arg(endpoint_arg(destination));
        command
    }

    /// `aws s3 ls s3://BUCKET/PREFIX/ --recursive`.
    #[must_use]
    pub fn list(program: impl Into<OsString>, bucket: &str, prefix: &str) -> Self {
        let mut command = Self::new(program);
        command.push_arg("s3");
        command.push_arg("ls");
        command.push_arg(ObjectUri::listing(bucket, prefix));
        command.push_arg("--recursive");
        command
    }

    /// Appends a positional argument.
    pub fn push_arg(&mut self, arg: impl Into<OsString>) {
        self.args.push(arg.into());
    }

    /// Selects a named credentials profile (`--profile NAME`).
    ///
    /// Empty names are ignored.
    pub fn set_profile<S: Into<String>>(&mut self, profile: Option<S>) {
        self.profile = profile.map(Into::into).filter(|name| !name.is_empty());
    }

    fn rendered_args(&self) -> Vec<OsString> {
        let mut args = self.args.clone();
        if let Some(profile) = &self.profile {
            args.push(OsString::from("--profile"));
            args.push(OsString::from(profile));
        }
        args
    }

    /// Converts the builder into a [`Command`] ready to spawn.
    #[must_use]
    pub fn into_command(self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.rendered_args());
        command
    }

    /// Returns the program and argument vector that would be executed.
    #[doc(hidden)]
    #[must_use]
    pub fn command_parts_for_testing(&self) -> (OsString, Vec<OsString>) {
        (self.program.clone(), self.rendered_args())
    }
}

fn endpoint_arg(endpoint: &Endpoint) -> OsString {
    match endpoint {
        Endpoint::Local(path) => path.as_os_str().to_owned(),
        Endpoint::Remote(uri) => OsString::from(uri.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_to_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn assembles_download_command() {
        let command = AwsCliCommand::copy(
            DEFAULT_AWS_PROGRAM,
            &Endpoint::Remote("s3://bucket/a/b.txt".parse().expect("uri")),
            &Endpoint::Local(PathBuf::from("downloads/a/b.txt")),
        );
        let (program, args) = command.command_parts_for_testing();

        assert_eq!(program, OsString::from("aws"));
        assert_eq!(
            args_to_strings(&args),
            ["s3", "cp", "s3://bucket/a/b.txt", "downloads/a/b.txt"]
        );
    }

    #[test]
    fn assembles_recursive_listing_with_profile() {
        let mut command = AwsCliCommand::list("/opt/aws", "bucket", "logs/");
        command.set_profile(Some("audit"));
        let (program, args) = command.command_parts_for_testing();

        assert_eq!(program, OsString::from("/opt/aws"));
        assert_eq!(
            args_to_strings(&args),
            ["s3", "ls", "s3://bucket/logs/", "--recursive", "--profile", "audit"]
        );
    }

    #[test]
    fn empty_profile_is_ignored() {
        let mut command = AwsCliCommand::version("aws");
        command.set_profile(Some(""));
        let (_, args) = command.command_parts_for_testing();
        assert_eq!(args_to_strings(&args), ["--version"]);
    }
}
