use std::io;
use std::path::PathBuf;

use engine::{EnumerationError, SchedulerError};
use filters::FilterError;
use thiserror::Error;
use transport::ObjectUriError;

use crate::{ExitCode, HasExitCode};

/// Fatal errors that stop a run before or while scheduling transfers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML or has unknown keys.
    #[error("invalid config file {}: {source}", path.display())]
    ConfigParse {
        /// File that was parsed.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },
    /// A setting has a value outside its permitted range.
    #[error("invalid {setting}: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        setting: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The bucket name is unusable.
    #[error(transparent)]
    Bucket(#[from] ObjectUriError),
    /// An include or exclude pattern did not compile.
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),
    /// The candidate set could not be produced.
    #[error("enumeration failed: {0}")]
    Enumeration(#[from] EnumerationError),
    /// The worker pool could not be started.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// The `aws` CLI is missing or unusable.
    #[error("aws CLI unavailable ({program}): {source}")]
    Probe {
        /// Executable that was probed.
        program: String,
        /// Failure reported by the probe.
        #[source]
        source: io::Error,
    },
    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signal {
        /// Underlying registration error.
        #[source]
        source: io::Error,
    },
}

impl ClientError {
    pub(crate) fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting,
            reason: reason.into(),
        }
    }
}

impl HasExitCode for ClientError {
    fn exit_code(&self) -> ExitCode {
        ExitCode::Setup
    }
}
