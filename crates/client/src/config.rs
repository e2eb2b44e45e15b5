//! Run configuration.
//!
//! A [`TransferConfig`] is assembled in three layers: built-in defaults, then
//! values from an optional TOML [`ConfigFile`], then explicit command-line
//! options. Later layers override earlier ones.
//!
//! ```toml
//! [transfer]
//! workers = 8
//! retries = 5
//! backoff_ms = 250
//! max_backoff_ms = 10000
//! timeout_secs = 600
//! profile = "prod"
//!
//! [classify]
//! transient = ["RequestTimeTooSkewed"]
//! permanent = ["InvalidObjectState"]
//! ```

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{Classifier, Direction, RetryPolicy};
use serde::Deserialize;
use transport::{DEFAULT_AWS_PROGRAM, ObjectUri};

use crate::ClientError;

/// Default number of concurrent transfers.
pub const DEFAULT_WORKERS: usize = 5;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Where uploaded files come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UploadSource {
    /// Every regular file below a directory (or a single file).
    Directory(PathBuf),
    /// An explicit list of files, keyed by file name.
    Files(Vec<PathBuf>),
}

/// What to transfer and where.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransferRequest {
    /// Local files to a bucket.
    Upload {
        /// Local source.
        source: UploadSource,
        /// Destination bucket.
        bucket: String,
        /// Key prefix inside the bucket; may be empty.
        prefix: String,
    },
    /// Bucket objects to a local directory.
    Download {
        /// Source bucket.
        bucket: String,
        /// Key prefix to download; may be empty.
        prefix: String,
        /// Local directory receiving the files.
        destination: PathBuf,
    },
}

impl TransferRequest {
    /// Returns the transfer direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Upload { .. } => Direction::Upload,
            Self::Download { .. } => Direction::Download,
        }
    }

    /// Returns the bucket involved in the transfer.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::Upload { bucket, .. } | Self::Download { bucket, .. } => bucket,
        }
    }

    /// Returns the key prefix involved in the transfer.
    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::Upload { prefix, .. } | Self::Download { prefix, .. } => prefix,
        }
    }
}

/// Validated description of one run.
#[derive(Clone, Debug)]
pub struct TransferConfig {
    request: TransferRequest,
    includes: Vec<String>,
    excludes: Vec<String>,
    workers: usize,
    retry: RetryPolicy,
    timeout: Option<Duration>,
    profile: Option<String>,
    dry_run: bool,
    recursive: bool,
    follow_symlinks: bool,
    classifier: Classifier,
    program: OsString,
}

impl TransferConfig {
    /// Starts a builder populated with the built-in defaults.
    #[must_use]
    pub fn builder(request: TransferRequest) -> TransferConfigBuilder {
        TransferConfigBuilder::new(request)
    }

    /// Returns the transfer request.
    #[must_use]
    pub const fn request(&self) -> &TransferRequest {
        &self.request
    }

    /// Returns the include patterns.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Returns the exclude patterns.
    #[must_use]
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Returns the maximum number of concurrent transfers.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the per-attempt timeout, or `None` when disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the named credential profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Returns `true` when transfers are only reported.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns `true` when local directories are walked recursively.
    #[must_use]
    pub const fn recursive(&self) -> bool {
        self.recursive
    }

    /// Returns `true` when symlinked directories are entered.
    #[must_use]
    pub const fn follow_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    /// Returns the failure classifier.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Returns the `aws` executable.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }
}

macro_rules! builder_setter {
    ($(#[$meta:meta])* $field:ident: $ty:ty $(,)?) => {
        $(#[$meta])*
        #[must_use]
        pub fn $field(mut self, $field: $ty) -> Self {
            self.$field = $field;
            self
        }
    };
}

/// Builder for [`TransferConfig`].
#[derive(Clone, Debug)]
pub struct TransferConfigBuilder {
    request: TransferRequest,
    includes: Vec<String>,
    excludes: Vec<String>,
    workers: usize,
    retries: u32,
    backoff: Duration,
    max_backoff: Duration,
    timeout: Option<Duration>,
    profile: Option<String>,
    dry_run: bool,
    recursive: bool,
    follow_symlinks: bool,
    transient_markers: Vec<String>,
    permanent_markers: Vec<String>,
    program: OsString,
}

impl TransferConfigBuilder {
    fn new(request: TransferRequest) -> Self {
        let policy = RetryPolicy::default();
        Self {
            request,
            includes: Vec::new(),
            excludes: Vec::new(),
            workers: DEFAULT_WORKERS,
            retries: policy.max_attempts(),
            backoff: policy.base_delay(),
            max_backoff: policy.max_delay(),
            timeout: Some(DEFAULT_TIMEOUT),
            profile: None,
            dry_run: false,
            recursive: true,
            follow_symlinks: false,
            transient_markers: Vec::new(),
            permanent_markers: Vec::new(),
            program: OsString::from(DEFAULT_AWS_PROGRAM),
        }
    }

    builder_setter! {
        /// Include patterns; when non-empty only matching files are transferred.
        #[doc(alias = "--include")]
        #[doc(alias = "--pattern")]
        includes: Vec<String>,
    }

    builder_setter! {
        /// Exclude patterns; matching files and directories are skipped.
        #[doc(alias = "--exclude")]
        excludes: Vec<String>,
    }

    builder_setter! {
        /// Maximum number of concurrent transfers. Must be at least one.
        #[doc(alias = "--workers")]
        workers: usize,
    }

    builder_setter! {
        /// Attempts per file, including the first. Must be at least one.
        #[doc(alias = "--retries")]
        retries: u32,
    }

    builder_setter! {
        /// Delay before the first retry.
        #[doc(alias = "--backoff-ms")]
        backoff: Duration,
    }

    builder_setter! {
        /// Upper bound on any single retry delay.
        max_backoff: Duration,
    }

    builder_setter! {
        /// Per-attempt timeout; `None` disables it.
        #[doc(alias = "--timeout")]
        timeout: Option<Duration>,
    }

    builder_setter! {
        /// Named credential profile passed to the `aws` CLI.
        #[doc(alias = "--profile")]
        profile: Option<String>,
    }

    builder_setter! {
        /// Report transfers without performing them.
        #[doc(alias = "--dry-run")]
        dry_run: bool,
    }

    builder_setter! {
        /// Walk local directories recursively.
        #[doc(alias = "--no-recursive")]
        recursive: bool,
    }

    builder_setter! {
        /// Enter symlinked directories while walking.
        #[doc(alias = "--follow-symlinks")]
        follow_symlinks: bool,
    }

    builder_setter! {
        /// `aws` executable to run.
        #[doc(alias = "--aws-cli")]
        program: OsString,
    }

    /// Sets the per-attempt timeout in seconds; `0` disables it.
    #[must_use]
    pub const fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = if seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(seconds))
        };
        self
    }

    /// Adds classifier markers on top of the defaults.
    #[must_use]
    pub fn extra_markers(mut self, transient: Vec<String>, permanent: Vec<String>) -> Self {
        self.transient_markers.extend(transient);
        self.permanent_markers.extend(permanent);
        self
    }

    /// Applies every value present in `file`.
    #[must_use]
    pub fn apply_file(mut self, file: &ConfigFile) -> Self {
        let transfer = &file.transfer;
        if let Some(workers) = transfer.workers {
            self.workers = workers;
        }
        if let Some(retries) = transfer.retries {
            self.retries = retries;
        }
        if let Some(backoff) = transfer.backoff_ms {
            self.backoff = Duration::from_millis(backoff);
        }
        if let Some(max_backoff) = transfer.max_backoff_ms {
            self.max_backoff = Duration::from_millis(max_backoff);
        }
        if let Some(seconds) = transfer.timeout_secs {
            self = self.timeout_secs(seconds);
        }
        if let Some(profile) = &transfer.profile {
            self.profile = Some(profile.clone());
        }
        self.extra_markers(
            file.classify.transient.clone(),
            file.classify.permanent.clone(),
        )
    }

    /// Validates the settings and produces the configuration.
    ///
    /// # Errors
    ///
    /// Rejects zero workers or retries, a backoff cap below the base delay,
    /// and unusable bucket names.
    pub fn build(self) -> Result<TransferConfig, ClientError> {
        if self.workers == 0 {
            return Err(ClientError::invalid("workers", "must be at least 1"));
        }
        if self.retries == 0 {
            return Err(ClientError::invalid("retries", "must be at least 1"));
        }
        if self.max_backoff < self.backoff {
            return Err(ClientError::invalid(
                "max backoff",
                format!(
                    "{}ms is below the base delay of {}ms",
                    self.max_backoff.as_millis(),
                    self.backoff.as_millis()
                ),
            ));
        }
        ObjectUri::new(self.request.bucket(), String::new())?;

        let retry = RetryPolicy::new()
            .with_max_attempts(self.retries)
            .with_base_delay(self.backoff)
            .with_max_delay(self.max_backoff);
        let classifier = Classifier::default()
            .with_transient_markers(self.transient_markers)
            .with_permanent_markers(self.permanent_markers);

        Ok(TransferConfig {
            request: self.request,
            includes: self.includes,
            excludes: self.excludes,
            workers: self.workers,
            retry,
            timeout: self.timeout,
            profile: self.profile.filter(|name| !name.is_empty()),
            dry_run: self.dry_run,
            recursive: self.recursive,
            follow_symlinks: self.follow_symlinks,
            classifier,
            program: self.program,
        })
    }
}

/// Contents of an s3bulk TOML configuration file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// `[transfer]` table.
    #[serde(default)]
    pub transfer: TransferSection,
    /// `[classify]` table.
    #[serde(default)]
    pub classify: ClassifySection,
}

/// `[transfer]` table of a [`ConfigFile`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransferSection {
    /// Concurrent transfers.
    pub workers: Option<usize>,
    /// Attempts per file.
    pub retries: Option<u32>,
    /// Base retry delay in milliseconds.
    pub backoff_ms: Option<u64>,
    /// Retry delay cap in milliseconds.
    pub max_backoff_ms: Option<u64>,
    /// Per-attempt timeout in seconds; `0` disables it.
    pub timeout_secs: Option<u64>,
    /// Credential profile.
    pub profile: Option<String>,
}

/// `[classify]` table of a [`ConfigFile`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassifySection {
    /// Extra transient markers.
    #[serde(default)]
    pub transient: Vec<String>,
    /// Extra permanent markers.
    #[serde(default)]
    pub permanent: Vec<String>,
}

impl ConfigFile {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = fs::read_to_string(path).map_err(|source| ClientError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ClientError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
