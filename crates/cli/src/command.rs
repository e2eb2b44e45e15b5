//! `clap` definition of the command line.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

/// Default download destination.
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "./downloads";

/// Builds the `clap` command used for parsing.
pub(crate) fn clap_command() -> Command {
    Command::new(crate::PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Concurrent bulk transfers between local files and S3 buckets.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Increase log verbosity (-v for debug, -vv for trace).")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .conflicts_with("verbose")
                .help("Only log warnings and errors.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Read defaults from a TOML configuration file.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("aws-cli")
                .long("aws-cli")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Run PATH instead of `aws`.")
                .action(ArgAction::Set),
        )
        .subcommand(upload_command())
        .subcommand(download_command())
}

fn upload_command() -> Command {
    let command = Command::new("upload")
        .about("Upload local files to a bucket.")
        .arg(
            Arg::new("directory")
                .long("directory")
                .short('d')
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Upload every file below DIR.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("files")
                .long("files")
                .value_name("FILE")
                .num_args(1..)
                .value_parser(value_parser!(PathBuf))
                .help("Upload the listed files, keyed by file name.")
                .action(ArgAction::Append),
        )
        .group(
            ArgGroup::new("source")
                .args(["directory", "files"])
                .required(true),
        );
    with_transfer_args(command)
}

fn download_command() -> Command {
    let command = Command::new("download")
        .about("Download objects below a prefix.")
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("DIR")
                .default_value(DEFAULT_OUTPUT_DIR)
                .value_parser(value_parser!(PathBuf))
                .help("Write downloaded files below DIR.")
                .action(ArgAction::Set),
        );
    with_transfer_args(command)
}

/// Options shared by both subcommands.
fn with_transfer_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("bucket")
                .long("bucket")
                .short('b')
                .value_name("BUCKET")
                .required(true)
                .help("Bucket name.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .short('p')
                .value_name("PREFIX")
                .help("Key prefix inside the bucket.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .visible_alias("pattern")
                .value_name("PATTERN")
                .help("Only transfer files matching PATTERN (repeatable).")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("PATTERN")
                .help("Skip files and directories matching PATTERN (repeatable).")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('w')
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Maximum concurrent transfers [default: 5].")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Attempts per file, including the first [default: 3].")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("backoff-ms")
                .long("backoff-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Delay before the first retry [default: 500].")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("max-backoff-ms")
                .long("max-backoff-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Upper bound on any retry delay [default: 30000].")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .value_parser(value_parser!(u64))
                .help("Per-attempt timeout, 0 disables it [default: 3600].")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("NAME")
                .help("Credential profile passed to the aws CLI.")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Report what would be transferred without transferring.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-recursive")
                .long("no-recursive")
                .help("Only upload files directly inside the source directory.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("follow-symlinks")
                .long("follow-symlinks")
                .help("Descend into symlinked directories.")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        clap_command().debug_assert();
    }
}
