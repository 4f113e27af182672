//! ValidationJob — single-flight execution of one validation at a time.
//!
//! `submit` returns immediately. If no job is in flight it marks the slot
//! busy and spawns the work on the tokio runtime; otherwise it rejects the
//! submission and leaves the running job alone. Every accepted job delivers
//! exactly one [`ValidationOutcome`] on the [`OutcomeReceiver`], and the
//! slot is cleared in the same critical section as the delivery, so a
//! consumer that has received an outcome can always submit again.
//!
//! ```ignore
//! let (job, mut outcomes) = ValidationJob::new(&ValidatorConfig::default())?;
//! assert!(job.submit("hello.py", "auto"));
//! let outcome = outcomes.recv().await;
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;

use crate::config::ValidatorConfig;
use crate::outcome::{MSG_MISMATCH, MSG_UNKNOWN_FAILURE, MSG_UNSUPPORTED, ValidationOutcome};
use crate::request::ValidationRequest;
use crate::runner::CommandRunner;
use crate::validator::select;

/// Errors constructing a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("validation jobs need a tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// The "validation in progress" slot, guarded by one lock.
#[derive(Debug, Default)]
struct JobState {
    in_progress: Mutex<bool>,
}

impl JobState {
    fn lock(&self) -> MutexGuard<'_, bool> {
        // The flag is a plain bool; a panic while holding it can't leave it torn.
        self.in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the busy slot for one accepted job.
///
/// Releasing happens in `complete`, or on drop if the task never got there.
struct InFlight {
    state: Arc<JobState>,
    released: bool,
}

impl InFlight {
    /// Test-and-set the slot.
    fn acquire(state: &Arc<JobState>) -> Option<Self> {
        let mut busy = state.lock();
        if *busy {
            return None;
        }
        *busy = true;
        Some(Self {
            state: Arc::clone(state),
            released: false,
        })
    }

    /// Deliver the outcome, then clear the slot, under one lock.
    fn complete(mut self, outcomes: &mpsc::UnboundedSender<ValidationOutcome>, outcome: ValidationOutcome) {
        let mut busy = self.state.lock();
        if outcomes.send(outcome).is_err() {
            tracing::warn!("outcome receiver dropped; outcome discarded");
        }
        *busy = false;
        self.released = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.released {
            *self.state.lock() = false;
        }
    }
}

/// Receiving end for outcomes. There is exactly one per job.
#[derive(Debug)]
pub struct OutcomeReceiver {
    rx: mpsc::UnboundedReceiver<ValidationOutcome>,
}

impl OutcomeReceiver {
    /// Wait for the next outcome. `None` once the job and its tasks are gone.
    pub async fn recv(&mut self) -> Option<ValidationOutcome> {
        self.rx.recv().await
    }

    /// Take a delivered outcome without waiting, for hosts that poll.
    pub fn try_recv(&mut self) -> Option<ValidationOutcome> {
        self.rx.try_recv().ok()
    }

    /// Wait from synchronous code. Must not be called from an async context.
    pub fn blocking_recv(&mut self) -> Option<ValidationOutcome> {
        self.rx.blocking_recv()
    }
}

/// Runs validations in the background, one at a time.
pub struct ValidationJob {
    state: Arc<JobState>,
    runner: CommandRunner,
    outcomes: mpsc::UnboundedSender<ValidationOutcome>,
    handle: Handle,
}

impl ValidationJob {
    /// Create a job on the current tokio runtime.
    pub fn new(config: &ValidatorConfig) -> Result<(Self, OutcomeReceiver), JobError> {
        Ok(Self::with_handle(Handle::try_current()?, config))
    }

    /// Create a job that spawns its work on `handle`.
    pub fn with_handle(handle: Handle, config: &ValidatorConfig) -> (Self, OutcomeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let job = Self {
            state: Arc::new(JobState::default()),
            runner: CommandRunner::new(config),
            outcomes: tx,
            handle,
        };
        (job, OutcomeReceiver { rx })
    }

    /// Submit a file for validation. Returns `false` if a job is in flight.
    pub fn submit(&self, file_path: &str, language_tag: &str) -> bool {
        self.submit_request(ValidationRequest::new(file_path, language_tag))
    }

    /// Submit an already-built request.
    pub fn submit_request(&self, request: ValidationRequest) -> bool {
        let path = request.file_path().to_string();
        let language = request.language().to_string();
        let runner = self.runner.clone();

        let accepted = self.start(process(request, runner));
        if accepted {
            tracing::info!(path = %path, language = %language, "validation accepted");
        } else {
            tracing::warn!(
                path = %path,
                language = %language,
                "validation already in progress, rejected"
            );
        }
        accepted
    }

    /// True while a job is between acceptance and delivery.
    pub fn is_busy(&self) -> bool {
        *self.state.lock()
    }

    /// Single-flight core: claim the slot and run `work` in the background.
    fn start<F>(&self, work: F) -> bool
    where
        F: Future<Output = ValidationOutcome> + Send + 'static,
    {
        let Some(in_flight) = InFlight::acquire(&self.state) else {
            return false;
        };

        let outcomes = self.outcomes.clone();
        let handle = self.handle.clone();
        self.handle.spawn(async move {
            // The work gets its own task so a panic surfaces as a JoinError.
            let outcome = match handle.spawn(work).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "validation task failed");
                    ValidationOutcome::system_error(MSG_UNKNOWN_FAILURE)
                }
            };
            tracing::info!(status = %outcome.status, "validation finished");
            in_flight.complete(&outcomes, outcome);
        });
        true
    }
}

impl std::fmt::Debug for ValidationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationJob")
            .field("busy", &self.is_busy())
            .field("runner", &self.runner)
            .finish()
    }
}

/// One request, start to finish. Every failure becomes outcome text.
async fn process(request: ValidationRequest, runner: CommandRunner) -> ValidationOutcome {
    let path = request.file_path();

    if path.is_empty() {
        return ValidationOutcome::no_file();
    }
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => return ValidationOutcome::file_missing(path),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "cannot stat source file");
            return validation_failed(e);
        }
    }

    let Some(validator) = select(request.language(), path) else {
        return ValidationOutcome::selection_error(MSG_UNSUPPORTED);
    };
    if !validator.is_compatible(path) {
        return ValidationOutcome::selection_error(MSG_MISMATCH);
    }

    validator
        .validate(path, &runner)
        .await
        .unwrap_or_else(validation_failed)
}

fn validation_failed(e: impl std::fmt::Display) -> ValidationOutcome {
    ValidationOutcome::system_error(format!("Error occurred during validation: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use crate::runner::CommandSpec;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn job() -> (ValidationJob, OutcomeReceiver) {
        ValidationJob::new(&ValidatorConfig::default()).expect("inside runtime")
    }

    #[test]
    fn new_outside_runtime_is_an_error() {
        let err = ValidationJob::new(&ValidatorConfig::default()).expect_err("no runtime");
        assert!(matches!(err, JobError::NoRuntime(_)));
    }

    #[tokio::test]
    async fn starts_idle() {
        let (job, mut outcomes) = job();
        assert!(!job.is_busy());
        assert!(outcomes.try_recv().is_none());
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_first_runs() {
        let (job, mut outcomes) = job();
        let (release, gate) = oneshot::channel::<()>();

        assert!(job.start(async move {
            let _ = gate.await;
            ValidationOutcome::runtime_output("first")
        }));
        assert!(job.is_busy());

        let second_ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&second_ran);
        assert!(!job.start(async move {
            *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
            ValidationOutcome::runtime_output("second")
        }));

        release.send(()).expect("gate open");
        let outcome = outcomes.recv().await.expect("one outcome");
        assert_eq!(outcome, ValidationOutcome::runtime_output("first"));
        assert!(!job.is_busy());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(outcomes.try_recv().is_none());
        assert!(!*second_ran.lock().unwrap_or_else(PoisonError::into_inner));
    }

    #[tokio::test]
    async fn slot_is_free_as_soon_as_outcome_arrives() {
        let (job, mut outcomes) = job();

        assert!(job.start(async { ValidationOutcome::no_file() }));
        outcomes.recv().await.expect("outcome");
        assert!(job.start(async { ValidationOutcome::no_file() }));
        outcomes.recv().await.expect("outcome");
    }

    #[tokio::test]
    async fn panic_in_work_still_delivers_and_releases() {
        let (job, mut outcomes) = job();

        fn explode() -> ValidationOutcome {
            panic!("tool wrapper exploded");
        }

        assert!(job.start(async { explode() }));

        let outcome = outcomes.recv().await.expect("outcome despite panic");
        assert_eq!(outcome.status, OutcomeStatus::SystemError);
        assert_eq!(outcome.message, MSG_UNKNOWN_FAILURE);
        assert!(!job.is_busy());
    }

    #[tokio::test]
    async fn tool_that_cannot_start_is_a_system_error() {
        let spec = CommandSpec::new("/nonexistent/codeval-python").path_arg("hello.py");
        let err = CommandRunner::default().run(&spec).await.expect_err("should not spawn");

        let outcome = validation_failed(err);
        assert_eq!(outcome.status, OutcomeStatus::SystemError);
        assert!(
            outcome
                .message
                .starts_with("Error occurred during validation: Error executing command: "),
            "{}",
            outcome.message
        );
        assert!(outcome.message.contains("/nonexistent/codeval-python"));
    }

    #[test]
    fn dropped_guard_releases_slot() {
        let state = Arc::new(JobState::default());
        let guard = InFlight::acquire(&state).expect("free");
        assert!(InFlight::acquire(&state).is_none());
        drop(guard);
        assert!(InFlight::acquire(&state).is_some());
    }

    #[test]
    fn complete_delivers_then_releases() {
        let state = Arc::new(JobState::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let guard = InFlight::acquire(&state).expect("free");
        guard.complete(&tx, ValidationOutcome::no_file());

        assert!(!*state.lock());
        assert_eq!(rx.try_recv().ok(), Some(ValidationOutcome::no_file()));
    }

    #[test]
    fn with_handle_works_from_sync_code() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let (job, mut outcomes) =
            ValidationJob::with_handle(runtime.handle().clone(), &ValidatorConfig::default());

        assert!(job.submit("", "auto"));
        let outcome = outcomes.blocking_recv().expect("outcome");
        assert_eq!(outcome, ValidationOutcome::no_file());
    }
}
