use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::Endpoint;

/// Options applied to a single primitive call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InvokeOptions {
    timeout: Option<Duration>,
}

impl InvokeOptions {
    /// Creates options without a timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Bounds the wall-clock time of the call. `None` waits indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Outcome of a primitive call that managed to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    /// Exit status, or `None` when the process was terminated by a signal or
    /// killed after a timeout.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Set when the call was aborted because it exceeded its timeout.
    pub timed_out: bool,
}

impl Invocation {
    /// A successful call with no output.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: Some(0),
            ..Self::default()
        }
    }

    /// A failed call with the given status and stderr text.
    #[must_use]
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// A call that was killed after exceeding `timeout`.
    #[must_use]
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            status: None,
            stderr: format!("timed out after {}s", timeout.as_secs()),
            timed_out: true,
            ..Self::default()
        }
    }

    /// Returns `true` when the call exited with status `0`.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }

    /// Best human-readable explanation of a failure.
    ///
    /// Prefers trimmed stderr, then stdout, then a description of the status.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_owned();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_owned();
        }
        match self.status {
            Some(code) => format!("exited with status {code}"),
            None => "terminated without an exit status".to_owned(),
        }
    }
}

/// Moves a single file between two endpoints.
///
/// Implementations block the calling thread for the duration of the transfer
/// and must be safe to call from many worker threads at once.
pub trait TransferPrimitive: Send + Sync {
    /// Performs one transfer attempt.
    ///
    /// Returns `Err` only when the transfer could not be started at all (for
    /// example the helper binary is missing).
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        options: &InvokeOptions,
    ) -> io::Result<Invocation>;
}

impl<T: TransferPrimitive + ?Sized> TransferPrimitive for Arc<T> {
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        options: &InvokeOptions,
    ) -> io::Result<Invocation> {
        (**self).invoke(source, destination, options)
    }
}

impl<T: TransferPrimitive + ?Sized> TransferPrimitive for &T {
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        options: &InvokeOptions,
    ) -> io::Result<Invocation> {
        (**self).invoke(source, destination, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_status_without_timeout() {
        assert!(Invocation::success().succeeded());
        assert!(!Invocation::failure(1, "boom").succeeded());
        assert!(!Invocation::timeout(Duration::from_secs(5)).succeeded());
    }

    #[test]
    fn diagnostic_prefers_stderr_then_stdout_then_status() {
        let mut invocation = Invocation::failure(2, "  denied \n");
        assert_eq!(invocation.diagnostic(), "denied");

        invocation.stderr.clear();
        invocation.stdout = "upload failed: throttled".to_owned();
        assert_eq!(invocation.diagnostic(), "upload failed: throttled");

        invocation.stdout.clear();
        assert_eq!(invocation.diagnostic(), "exited with status 2");

        invocation.status = None;
        assert_eq!(invocation.diagnostic(), "terminated without an exit status");
    }

    #[test]
    fn timeout_invocation_mentions_duration() {
        let invocation = Invocation::timeout(Duration::from_secs(90));
        assert!(invocation.timed_out);
        assert_eq!(invocation.diagnostic(), "timed out after 90s");
    }

    #[test]
    fn options_carry_timeout() {
        let options = InvokeOptions::new().with_timeout(Some(Duration::from_secs(3)));
        assert_eq!(options.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(InvokeOptions::default().timeout(), None);
    }
}
