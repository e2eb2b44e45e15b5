//! Conversion of parsed arguments into a [`TransferConfig`].

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use clap::error::ErrorKind;
use client::{ClientError, ConfigFile, TransferConfig, TransferRequest, UploadSource};

use crate::command::clap_command;

/// Parsed command produced by [`parse_args`].
#[derive(Debug)]
pub(crate) struct ParsedArgs {
    pub(crate) request: TransferRequest,
    pub(crate) includes: Vec<String>,
    pub(crate) excludes: Vec<String>,
    pub(crate) workers: Option<usize>,
    pub(crate) retries: Option<u32>,
    pub(crate) backoff_ms: Option<u64>,
    pub(crate) max_backoff_ms: Option<u64>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) profile: Option<String>,
    pub(crate) dry_run: bool,
    pub(crate) recursive: bool,
    pub(crate) follow_symlinks: bool,
    pub(crate) config: Option<PathBuf>,
    pub(crate) aws_cli: Option<PathBuf>,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();

    if args.is_empty() {
        args.push(OsString::from(crate::PROGRAM_NAME));
    }

    let mut command = clap_command();
    let mut matches = command.try_get_matches_from_mut(args)?;
    let Some((name, mut sub)) = matches.remove_subcommand() else {
        return Err(command.error(ErrorKind::MissingSubcommand, "a subcommand is required"));
    };

    let bucket = remove_string(&mut sub, "bucket").unwrap_or_default();
    let prefix = remove_string(&mut sub, "prefix").unwrap_or_default();
    let request = if name == "upload" {
        let source = match sub.remove_one::<PathBuf>("directory") {
            Some(directory) => UploadSource::Directory(directory),
            None => UploadSource::Files(
                sub.remove_many::<PathBuf>("files")
                    .map(Iterator::collect)
                    .unwrap_or_default(),
            ),
        };
        TransferRequest::Upload {
            source,
            bucket,
            prefix,
        }
    } else {
        TransferRequest::Download {
            bucket,
            prefix,
            destination: sub
                .remove_one::<PathBuf>("output")
                .unwrap_or_else(|| PathBuf::from(crate::command::DEFAULT_OUTPUT_DIR)),
        }
    };

    Ok(ParsedArgs {
        request,
        includes: remove_strings(&mut sub, "include"),
        excludes: remove_strings(&mut sub, "exclude"),
        workers: sub.remove_one::<usize>("workers"),
        retries: sub.remove_one::<u32>("retries"),
        backoff_ms: sub.remove_one::<u64>("backoff-ms"),
        max_backoff_ms: sub.remove_one::<u64>("max-backoff-ms"),
        timeout_secs: sub.remove_one::<u64>("timeout"),
        profile: remove_string(&mut sub, "profile"),
        dry_run: sub.get_flag("dry-run"),
        recursive: !sub.get_flag("no-recursive"),
        follow_symlinks: sub.get_flag("follow-symlinks"),
        config: sub.remove_one::<PathBuf>("config"),
        aws_cli: sub.remove_one::<PathBuf>("aws-cli"),
        verbose: sub.get_count("verbose"),
        quiet: sub.get_flag("quiet"),
    })
}

fn remove_string(matches: &mut ArgMatches, id: &str) -> Option<String> {
    matches.remove_one::<String>(id)
}

fn remove_strings(matches: &mut ArgMatches, id: &str) -> Vec<String> {
    matches
        .remove_many::<String>(id)
        .map(Iterator::collect)
        .unwrap_or_default()
}

impl ParsedArgs {
    /// Layers the configuration file (if any) and the explicit options over
    /// the built-in defaults.
    pub(crate) fn into_config(self) -> Result<TransferConfig, ClientError> {
        let Self {
            request,
            includes,
            excludes,
            workers,
            retries,
            backoff_ms,
            max_backoff_ms,
            timeout_secs,
            profile,
            dry_run,
            recursive,
            follow_symlinks,
            config,
            aws_cli,
            ..
        } = self;

        let mut builder = TransferConfig::builder(request);
        if let Some(path) = config {
            builder = builder.apply_file(&ConfigFile::load(&path)?);
        }
        builder = builder
            .includes(includes)
            .excludes(excludes)
            .dry_run(dry_run)
            .recursive(recursive)
            .follow_symlinks(follow_symlinks);
        if let Some(workers) = workers {
            builder = builder.workers(workers);
        }
        if let Some(retries) = retries {
            builder = builder.retries(retries);
        }
        if let Some(backoff) = backoff_ms {
            builder = builder.backoff(Duration::from_millis(backoff));
        }
        if let Some(max_backoff) = max_backoff_ms {
            builder = builder.max_backoff(Duration::from_millis(max_backoff));
        }
        if let Some(seconds) = timeout_secs {
            builder = builder.timeout_secs(seconds);
        }
        if profile.is_some() {
            builder = builder.profile(profile);
        }
        if let Some(program) = aws_cli {
            builder = builder.program(program.into_os_string());
        }
        builder.build()
    }
}
