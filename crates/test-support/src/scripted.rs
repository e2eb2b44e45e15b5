use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use engine::CancellationToken;
use transport::{Endpoint, InvokeOptions, Invocation, TransferPrimitive};

/// One canned outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// Exit status 0.
    Succeed,
    /// Non-zero exit with the given stderr.
    Fail {
        /// Exit status.
        status: i32,
        /// Diagnostic text.
        stderr: String,
    },
    /// Killed after the per-task timeout.
    TimedOut,
    /// The helper could not be started.
    SpawnError(io::ErrorKind),
}

impl Step {
    /// A throttling failure.
    pub fn transient() -> Self {
        Self::Fail {
            status: 1,
            stderr: "upload failed: An error occurred (SlowDown) when calling the PutObject operation"
                .to_owned(),
        }
    }

    /// An access-denied failure.
    pub fn permanent() -> Self {
        Self::Fail {
            status: 1,
            stderr: "upload failed: An error occurred (AccessDenied) when calling the PutObject operation: Access Denied"
                .to_owned(),
        }
    }

    fn play(&self) -> io::Result<Invocation> {
        match self {
            Self::Succeed => Ok(Invocation::success()),
            Self::Fail { status, stderr } => Ok(Invocation::failure(*status, stderr.clone())),
            Self::TimedOut => Ok(Invocation::timeout(Duration::from_secs(1))),
            Self::SpawnError(kind) => Err(io::Error::new(*kind, "scripted spawn failure")),
        }
    }
}

/// A recorded primitive call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Call {
    /// Source endpoint.
    pub source: Endpoint,
    /// Destination endpoint.
    pub destination: Endpoint,
}

/// In-memory [`TransferPrimitive`] that replays scripted outcomes.
///
/// Scripts are keyed by a suffix of the destination (for example the file
/// name). Each call pops the next step; the last step repeats. Destinations
/// with no script use the fallback step, which defaults to success.
#[derive(Debug)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    fallback: Step,
    delay: Duration,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// A transport where every call succeeds immediately.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback: Step::Succeed,
            delay: Duration::ZERO,
            cancel_after: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    /// Scripts the outcomes for destinations ending in `suffix`.
    pub fn with_script(self, suffix: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(suffix.into(), steps.into_iter().collect());
        self
    }

    /// Outcome for destinations without a script.
    pub fn with_fallback(mut self, step: Step) -> Self {
        self.fallback = step;
        self
    }

    /// Makes every call block for `delay` before returning.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancels `token` once `calls` calls have started.
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Every call made so far, in start order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of calls whose destination ends in `suffix`.
    pub fn calls_for(&self, suffix: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.destination.to_string().ends_with(suffix))
            .count()
    }

    /// Highest number of calls observed running at the same time.
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    fn next_step(&self, destination: &Endpoint) -> Step {
        let rendered = destination.to_string();
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts
            .iter_mut()
            .filter(|(suffix, _)| rendered.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, steps)| steps);
        match script {
            Some(steps) if steps.len() > 1 => steps.pop_front().unwrap_or(Step::Succeed),
            Some(steps) => steps.front().cloned().unwrap_or(Step::Succeed),
            None => self.fallback.clone(),
        }
    }
}

impl TransferPrimitive for ScriptedTransport {
    fn invoke(
        &self,
        source: &Endpoint,
        destination: &Endpoint,
        _options: &InvokeOptions,
    ) -> io::Result<Invocation> {
        let started = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(Call {
                source: source.clone(),
                destination: destination.clone(),
            });
            calls.len()
        };
        if let Some((limit, token)) = &self.cancel_after {
            if started >= *limit {
                token.cancel();
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let step = self.next_step(destination);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        step.play()
    }
}
