//! Transient/permanent classification of failed attempts.
//!
//! The transfer primitive only reports an exit status and free-form text, so
//! classification is substring matching over the lowercased diagnostic.
//!
//! When the diagnostic carries a service error code (`An error occurred
//! (SlowDown)`), the code alone is matched first, so file names echoed
//! earlier in the message cannot change the outcome. Otherwise the whole
//! text is matched. In both passes transient markers are consulted before
//! permanent ones, which lets a configured transient marker override a
//! default permanent one. Text that matches neither list is treated as
//! transient so that an unfamiliar error still gets retried.

use std::fmt;
use std::io;

use transport::Invocation;

/// Substrings marking a failure worth retrying.
pub const DEFAULT_TRANSIENT_MARKERS: &[&str] = &[
    "throttl",
    "timeout",
    "timed out",
    "slow down",
    "slowdown",
    "connection reset",
    "connection was closed",
    "could not connect",
    "internalerror",
    "service unavailable",
    "serviceunavailable",
    "temporarily unavailable",
];

/// Substrings marking a failure that will not succeed on retry.
pub const DEFAULT_PERMANENT_MARKERS: &[&str] = &[
    "permission denied",
    "accessdenied",
    "access denied",
    "forbidden",
    "no such",
    "nosuchbucket",
    "nosuchkey",
    "does not exist",
    "not found",
    "invalid",
];

/// Retry category of a failed attempt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    /// May succeed if tried again.
    Transient,
    /// Will not succeed if tried again.
    Permanent,
    /// The run was cancelled while the task still had attempts left.
    Cancelled,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Maps primitive failures to an [`ErrorClass`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classifier {
    transient: Vec<String>,
    permanent: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::empty()
            .with_transient_markers(DEFAULT_TRANSIENT_MARKERS.iter().copied())
            .with_permanent_markers(DEFAULT_PERMANENT_MARKERS.iter().copied())
    }
}

impl Classifier {
    /// A classifier with no markers, which classifies every failure as
    /// transient.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            transient: Vec::new(),
            permanent: Vec::new(),
        }
    }

    /// Adds markers for transient failures. Matching is case-insensitive.
    #[must_use]
    pub fn with_transient_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transient.extend(normalise(markers));
        self
    }

    /// Adds markers for permanent failures. Matching is case-insensitive.
    #[must_use]
    pub fn with_permanent_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.permanent.extend(normalise(markers));
        self
    }

    /// Classifies free-form diagnostic text.
    #[must_use]
    pub fn classify_text(&self, text: &str) -> ErrorClass {
        let lowered = text.to_lowercase();
        service_error_code(&lowered)
            .and_then(|code| self.match_markers(code))
            .or_else(|| self.match_markers(&lowered))
            .unwrap_or(ErrorClass::Transient)
    }

    fn match_markers(&self, lowered: &str) -> Option<ErrorClass> {
        if contains_any(&self.transient, lowered) {
            Some(ErrorClass::Transient)
        } else if contains_any(&self.permanent, lowered) {
            Some(ErrorClass::Permanent)
        } else {
            None
        }
    }

    /// Classifies a primitive call that ran and failed.
    ///
    /// Calls killed by the per-attempt timeout are always transient.
    #[must_use]
    pub fn classify_failure(&self, invocation: &Invocation) -> ErrorClass {
        if invocation.timed_out {
            return ErrorClass::Transient;
        }
        self.classify_text(&invocation.diagnostic())
    }

    /// Classifies a primitive call that could not be started.
    ///
    /// A missing or non-executable helper will not appear between attempts.
    #[must_use]
    pub fn classify_spawn_error(&self, error: &io::Error) -> ErrorClass {
        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ErrorClass::Permanent,
            _ => self.classify_text(&error.to_string()),
        }
    }
}

fn contains_any(markers: &[String], lowered: &str) -> bool {
    markers.iter().any(|marker| lowered.contains(marker.as_str()))
}

/// Extracts `code` from the last `an error occurred (code)` in `lowered`.
fn service_error_code(lowered: &str) -> Option<&str> {
    const PREFIX: &str = "an error occurred (";
    let start = lowered.rfind(PREFIX)? + PREFIX.len();
    let rest = &lowered[start..];
    let end = rest.find(')')?;
    Some(rest[..end].trim()).filter(|code| !code.is_empty())
}

fn normalise<I, S>(markers: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    markers
        .into_iter()
        .map(|m| m.as_ref().trim().to_lowercase())
        .filter(|m| !m.is_empty())
}
