use std::thread;
use std::time::{Duration, Instant};

use crate::CancellationToken;

/// Default number of attempts per task, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on any single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// How many times a task is attempted and how long to wait in between.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt limit. Values below one are raised to one.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }

    /// Sets the delay before the second attempt.
    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the cap applied to every delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Returns the attempt limit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base delay.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the delay cap.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self.base_delay, self.max_delay)
    }
}

/// Exponential backoff: `base * 2^(attempt - 1)`, capped at `cap`.
///
/// `attempt` is the 1-based number of the attempt that just failed, so the
/// first retry waits exactly `base`. Overflow saturates to `cap`.
///
/// ```
/// use std::time::Duration;
/// use engine::backoff_delay;
///
/// let base = Duration::from_millis(500);
/// let cap = Duration::from_secs(30);
/// assert_eq!(backoff_delay(1, base, cap), Duration::from_millis(500));
/// assert_eq!(backoff_delay(3, base, cap), Duration::from_secs(2));
/// assert_eq!(backoff_delay(40, base, cap), cap);
/// ```
#[must_use]
pub fn backoff_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let factor = 1_u32.checked_shl(exponent).unwrap_or(u32::MAX);
    base.checked_mul(factor).map_or(cap, |delay| delay.min(cap))
}

/// Waits out a backoff delay.
///
/// Abstracted so tests can observe delays without sleeping.
pub trait Sleeper: Send + Sync {
    /// Waits for `duration` or until `cancellation` fires.
    ///
    /// Returns `false` if the wait was cut short by cancellation.
    fn sleep(&self, duration: Duration, cancellation: &CancellationToken) -> bool;
}

/// [`Sleeper`] backed by [`std::thread::sleep`], polling for cancellation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, cancellation: &CancellationToken) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if cancellation.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

impl<T: Sleeper + ?Sized> Sleeper for std::sync::Arc<T> {
    fn sleep(&self, duration: Duration, cancellation: &CancellationToken) -> bool {
        (**self).sleep(duration, cancellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_until_cap() {
        let policy = RetryPolicy::new()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(700));
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(policy.delay_after(4), Duration::from_millis(700));
    }

    #[test]
    fn attempt_zero_waits_base() {
        let base = Duration::from_millis(10);
        assert_eq!(backoff_delay(0, base, Duration::from_secs(1)), base);
    }

    #[test]
    fn huge_attempts_saturate() {
        let cap = Duration::from_secs(30);
        assert_eq!(backoff_delay(u32::MAX, Duration::from_secs(1), cap), cap);
        assert_eq!(backoff_delay(33, Duration::from_secs(u64::MAX / 2), cap), cap);
    }

    #[test]
    fn zero_attempts_become_one() {
        assert_eq!(RetryPolicy::new().with_max_attempts(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn thread_sleeper_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let started = Instant::now();
        assert!(!ThreadSleeper.sleep(Duration::from_secs(10), &token));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn thread_sleeper_completes_short_waits() {
        let token = CancellationToken::new();
        assert!(ThreadSleeper.sleep(Duration::from_millis(5), &token));
    }
}
