//! Single-task execution with classification and bounded retry.

use std::time::Instant;

use logging::targets::{CMD, RETRY};
use tracing::{debug, trace, warn};
use transport::{InvokeOptions, TransferPrimitive};

use crate::{
    Classifier, ErrorClass, RetryPolicy, RunContext, Sleeper, TaskResult, ThreadSleeper,
    TransferError, TransferTask,
};

/// Runs one task to a terminal [`TaskResult`].
///
/// Implementations are shared by every worker thread of a run.
pub trait Execute: Send + Sync {
    /// Drives `task` to completion, failure, or skip.
    fn execute(&self, task: TransferTask, context: &RunContext) -> TaskResult;
}

impl<T: Execute + ?Sized> Execute for &T {
    fn execute(&self, task: TransferTask, context: &RunContext) -> TaskResult {
        (**self).execute(task, context)
    }
}

/// [`Execute`] implementation wrapping a [`TransferPrimitive`].
///
/// Each attempt calls the primitive once on the current thread. Failed
/// attempts are classified; permanent failures end the task immediately
/// while transient ones are retried after an exponential backoff until the
/// [`RetryPolicy`] runs out of attempts.
#[derive(Clone, Debug)]
pub struct TransferExecutor<P, S = ThreadSleeper> {
    primitive: P,
    classifier: Classifier,
    policy: RetryPolicy,
    options: InvokeOptions,
    sleeper: S,
}

impl<P> TransferExecutor<P> {
    /// Creates an executor with the default classifier and retry policy.
    #[must_use]
    pub fn new(primitive: P) -> Self {
        Self {
            primitive,
            classifier: Classifier::default(),
            policy: RetryPolicy::default(),
            options: InvokeOptions::new(),
            sleeper: ThreadSleeper,
        }
    }
}

impl<P, S> TransferExecutor<P, S> {
    /// Replaces the failure classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the options passed to every primitive call.
    #[must_use]
    pub fn with_invoke_options(mut self, options: InvokeOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the backoff sleeper.
    #[must_use]
    pub fn with_sleeper<T>(self, sleeper: T) -> TransferExecutor<P, T> {
        TransferExecutor {
            primitive: self.primitive,
            classifier: self.classifier,
            policy: self.policy,
            options: self.options,
            sleeper,
        }
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the wrapped primitive.
    #[must_use]
    pub const fn primitive(&self) -> &P {
        &self.primitive
    }
}

impl<P, S> TransferExecutor<P, S>
where
    P: TransferPrimitive,
{
    fn attempt(&self, task: &TransferTask) -> Result<(), TransferError> {
        match self
            .primitive
            .invoke(task.source(), task.destination(), &self.options)
        {
            Ok(invocation) if invocation.succeeded() => Ok(()),
            Ok(invocation) => Err(TransferError::new(
                self.classifier.classify_failure(&invocation),
                invocation.diagnostic(),
                invocation.status,
            )),
            Err(error) => Err(TransferError::new(
                self.classifier.classify_spawn_error(&error),
                error.to_string(),
                None,
            )),
        }
    }
}

impl<P, S> Execute for TransferExecutor<P, S>
where
    P: TransferPrimitive,
    S: Sleeper,
{
    fn execute(&self, mut task: TransferTask, context: &RunContext) -> TaskResult {
        let started = Instant::now();
        let mut last_error: Option<TransferError> = None;

        loop {
            if context.is_cancelled() {
                return match last_error {
                    None => TaskResult::skipped(task),
                    Some(error) => TaskResult::failed(task, error.cancelled(), started.elapsed()),
                };
            }

            let attempt = task.record_attempt();
            trace!(
                target: CMD,
                task = %task.id(),
                attempt,
                source = %task.source(),
                destination = %task.destination(),
                "invoking transfer"
            );

            let error = match self.attempt(&task) {
                Ok(()) => {
                    if attempt > 1 {
                        debug!(target: RETRY, key = task.relative(), attempt, "succeeded after retry");
                    }
                    return TaskResult::success(task, started.elapsed());
                }
                Err(error) => error,
            };

            if error.class() == ErrorClass::Permanent {
                debug!(target: RETRY, key = task.relative(), %error, "permanent failure, not retrying");
                return TaskResult::failed(task, error, started.elapsed());
            }
            if attempt >= self.policy.max_attempts() {
                debug!(target: RETRY, key = task.relative(), attempt, "attempts exhausted");
                return TaskResult::failed(task, error, started.elapsed());
            }

            let delay = self.policy.delay_after(attempt);
            warn!(
                target: RETRY,
                key = task.relative(),
                attempt,
                max = self.policy.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                "transfer failed, retrying: {}",
                error.message()
            );
            last_error = Some(error);
            self.sleeper.sleep(delay, context.cancellation());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use transport::{Endpoint, Invocation};

    use crate::{CancellationToken, TaskId, TaskOutcome};

    /// Replays canned invocations in order, repeating the last one.
    struct Replay {
        steps: Mutex<Vec<io::Result<Invocation>>>,
    }

    impl Replay {
        fn new(steps: Vec<io::Result<Invocation>>) -> Self {
            let mut steps = steps;
            steps.reverse();
            Self {
                steps: Mutex::new(steps),
            }
        }
    }

    impl TransferPrimitive for Replay {
        fn invoke(
            &self,
            _source: &Endpoint,
            _destination: &Endpoint,
            _options: &InvokeOptions,
        ) -> io::Result<Invocation> {
            let mut steps = self.steps.lock().expect("lock");
            if steps.len() > 1 {
                steps.pop().expect("step")
            } else {
                match steps.last().expect("step") {
                    Ok(invocation) => Ok(invocation.clone()),
                    Err(error) => Err(io::Error::new(error.kind(), error.to_string())),
                }
            }
        }
    }

    #[derive(Default)]
    struct NoSleep {
        delays: Mutex<Vec<Duration>>,
    }

    impl Sleeper for NoSleep {
        fn sleep(&self, duration: Duration, _cancellation: &CancellationToken) -> bool {
            self.delays.lock().expect("lock").push(duration);
            true
        }
    }

    fn task() -> TransferTask {
        TransferTask::new(
            TaskId::new(0),
            Endpoint::Local(PathBuf::from("/src/a.txt")),
            Endpoint::Remote("s3://bucket/a.txt".parse().expect("uri")),
            "a.txt",
            Some(1),
        )
    }

    fn executor(steps: Vec<io::Result<Invocation>>) -> TransferExecutor<Replay, NoSleep> {
        TransferExecutor::new(Replay::new(steps)).with_sleeper(NoSleep::default())
    }

    #[test]
    fn first_try_success() {
        let executor = executor(vec![Ok(Invocation::success())]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Success);
        assert_eq!(result.attempts(), 1);
        assert!(result.error().is_none());
    }

    #[test]
    fn transient_then_success_retries_with_backoff() {
        let executor = executor(vec![
            Ok(Invocation::failure(1, "Throttling: slow down")),
            Ok(Invocation::failure(1, "connection reset by peer")),
            Ok(Invocation::success()),
        ]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Success);
        assert_eq!(result.attempts(), 3);
        assert_eq!(
            *executor.sleeper.delays.lock().expect("lock"),
            [Duration::from_millis(500), Duration::from_secs(1)]
        );
    }

    #[test]
    fn always_transient_fails_after_max_attempts() {
        let executor = executor(vec![Ok(Invocation::failure(255, "service unavailable"))])
            .with_retry_policy(RetryPolicy::new().with_max_attempts(4));
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Failed);
        assert_eq!(result.attempts(), 4);
        let error = result.error().expect("error");
        assert_eq!(error.class(), ErrorClass::Transient);
        assert_eq!(error.exit_status(), Some(255));
        assert_eq!(error.message(), "service unavailable");
    }

    #[test]
    fn permanent_failure_is_not_retried() {
        let executor = executor(vec![Ok(Invocation::failure(1, "Permission denied"))]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Failed);
        assert_eq!(result.attempts(), 1);
        assert_eq!(result.error().expect("error").class(), ErrorClass::Permanent);
        assert!(executor.sleeper.delays.lock().expect("lock").is_empty());
    }

    #[test]
    fn throttled_upload_of_oddly_named_file_is_retried() {
        let executor = executor(vec![
            Ok(Invocation::failure(
                1,
                "upload failed: ./invalid-rows.csv to s3://bucket/invalid-rows.csv \
                 An error occurred (SlowDown) when calling the PutObject operation",
            )),
            Ok(Invocation::success()),
        ]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Success);
        assert_eq!(result.attempts(), 2);
    }

    #[test]
    fn missing_helper_is_permanent() {
        let executor = executor(vec![Err(io::Error::new(
            io::ErrorKind::NotFound,
            "No such file or directory",
        ))]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.attempts(), 1);
        assert_eq!(result.error().expect("error").class(), ErrorClass::Permanent);
    }

    #[test]
    fn timeout_is_retried() {
        let executor = executor(vec![
            Ok(Invocation::timeout(Duration::from_secs(3600))),
            Ok(Invocation::success()),
        ]);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Success);
        assert_eq!(result.attempts(), 2);
    }

    #[test]
    fn cancelled_before_first_attempt_is_skipped() {
        let executor = executor(vec![Ok(Invocation::success())]);
        let context = RunContext::default();
        context.cancellation().cancel();
        let result = executor.execute(task(), &context);
        assert_eq!(result.outcome(), TaskOutcome::Skipped);
        assert_eq!(result.attempts(), 0);
    }

    struct CancelOnSleep;

    impl Sleeper for CancelOnSleep {
        fn sleep(&self, _duration: Duration, cancellation: &CancellationToken) -> bool {
            cancellation.cancel();
            false
        }
    }

    #[test]
    fn cancelled_during_backoff_keeps_last_error() {
        let executor = TransferExecutor::new(Replay::new(vec![Ok(Invocation::failure(
            1,
            "could not connect to endpoint",
        ))]))
        .with_sleeper(CancelOnSleep);
        let result = executor.execute(task(), &RunContext::default());
        assert_eq!(result.outcome(), TaskOutcome::Failed);
        assert_eq!(result.attempts(), 1);
        let error = result.error().expect("error");
        assert_eq!(error.class(), ErrorClass::Cancelled);
        assert_eq!(error.message(), "could not connect to endpoint");
    }
}
