use std::fmt;

/// Level ladder selected on the command line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Progress lines and run summaries.
    #[default]
    Normal,
    /// Adds enumeration, scheduling and retry details.
    Verbose,
    /// Everything, including per-entry traversal decisions.
    Trace,
}

impl Verbosity {
    /// Returns the `s3bulk` level name used in filter directives.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration for a single process.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VerbosityConfig {
    verbosity: Verbosity,
    ansi: bool,
}

impl VerbosityConfig {
    /// Creates a configuration with the given verbosity and no colour.
    #[must_use]
    pub const fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            ansi: false,
        }
    }

    /// Maps `-q` and the number of `-v` flags to a configuration.
    ///
    /// `quiet` wins over any number of `-v` flags.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else {
            match verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        };
        Self::new(verbosity)
    }

    /// Enables or disables ANSI colour in formatted output.
    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Returns the configured verbosity.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Returns whether ANSI colour is enabled.
    #[must_use]
    pub const fn ansi(&self) -> bool {
        self.ansi
    }

    /// Renders the filter directive for this configuration.
    ///
    /// Third-party targets stay at `warn`; only `s3bulk` targets follow the
    /// selected verbosity.
    #[must_use]
    pub fn directive(&self) -> String {
        match self.verbosity {
            Verbosity::Quiet => "warn".to_owned(),
            other => format!("warn,s3bulk={}", other.as_str()),
        }
    }
}
