//! Job trait and the closure-backed task job

use crate::core::clock::{system_clock, SharedClock};
use crate::core::error::{BoxError, JobFailure, Result, TaskError};
use crate::meter::TimeMeter;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Numeric job identity
///
/// Pools hand out strictly increasing positive ids starting at 1. Jobs built
/// outside a pool carry [`UNASSIGNED_JOB_ID`].
pub type JobId = i64;

/// Id of a job that no pool has numbered
pub const UNASSIGNED_JOB_ID: JobId = -1;

/// A unit of work the task pool can run
///
/// Jobs are shared between the caller, the pool registry and the queue, so
/// every method takes `&self`.
pub trait Job: Send + Sync {
    /// The job id
    fn id(&self) -> JobId;

    /// Run the job once
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when the work failed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AlreadyStarted`] when the job was run before.
    fn run(&self) -> Result<bool>;

    /// Copy of the job's running timer
    fn running_timer(&self) -> TimeMeter;

    /// Where the job is in its lifecycle
    fn state(&self) -> JobState;

    /// Get the job's type name for debugging and statistics
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job{}({}, {:?})", self.id(), self.job_type(), self.state())
    }
}

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Not run yet
    Created,
    /// Running on some thread
    Running,
    /// Finished and produced a value
    Succeeded,
    /// Finished with a captured failure
    Failed,
}

impl JobState {
    /// Whether the job has finished either way
    pub fn is_finished(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

/// What a job produced
#[derive(Debug, Clone)]
pub enum JobOutcome<T> {
    /// The job has not finished running
    NotStarted,
    /// The callable returned a value
    Succeeded(T),
    /// The callable returned an error or panicked
    Failed(JobFailure),
}

impl<T> JobOutcome<T> {
    fn into_result(self, job_id: JobId) -> Result<T> {
        match self {
            JobOutcome::NotStarted => Err(TaskError::not_started(job_id)),
            JobOutcome::Succeeded(value) => Ok(value),
            JobOutcome::Failed(failure) => Err(TaskError::failed(job_id, failure)),
        }
    }
}

type Callable<T> = Box<dyn FnOnce() -> std::result::Result<T, BoxError> + Send>;

/// A job wrapping a closure
///
/// Arguments are whatever the closure captures. Running the job records the
/// outcome instead of handing an error to the caller of [`run`](TaskJob::run);
/// read it back with [`result`](TaskJob::result).
///
/// # Example
///
/// ```rust
/// use task_pool_engine::prelude::*;
///
/// let job = TaskJob::create(|| "x".parse::<i32>());
/// assert!(matches!(job.result(), Err(TaskError::NotStarted { .. })));
///
/// assert!(!job.run().unwrap());
/// assert!(matches!(job.result(), Err(TaskError::Failed { .. })));
/// assert!(job.running_timer().stopped());
/// ```
pub struct TaskJob<T> {
    id: JobId,
    name: String,
    callable: Mutex<Option<Callable<T>>>,
    outcome: Mutex<JobOutcome<T>>,
    timer: Mutex<TimeMeter>,
}

impl<T: Send + 'static> TaskJob<T> {
    /// Create a job with `id` on the system clock
    pub fn new<F, E>(id: JobId, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::with_clock(id, system_clock(), f)
    }

    /// Create a job with `id` whose timer reads `clock`
    pub fn with_clock<F, E>(id: JobId, clock: SharedClock, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let callable: Callable<T> =
            Box::new(move || -> std::result::Result<T, BoxError> { f().map_err(Into::into) });
        Self {
            id,
            name: "TaskJob".to_string(),
            callable: Mutex::new(Some(callable)),
            outcome: Mutex::new(JobOutcome::NotStarted),
            timer: Mutex::new(TimeMeter::with_clock(clock, false)),
        }
    }

    /// Create a job to run directly, outside any pool
    pub fn create<F, E>(f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::new(UNASSIGNED_JOB_ID, f)
    }
}

impl<T> TaskJob<T> {
    /// Give the job a custom name
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// The job id
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the closure once, capturing its outcome
    ///
    /// The running timer is started before the call and always stopped after
    /// it, whether the closure returned an error, panicked or succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AlreadyStarted`] if the job was run before. The
    /// closure's own failure is never returned here.
    pub fn run(&self) -> Result<bool> {
        let callable = {
            let mut timer = self.timer.lock();
            // the closure is taken exactly once, together with the timer start
            let Some(f) = self.callable.lock().take() else {
                return Err(TaskError::already_started(self.id));
            };
            timer.startup();
            f
        };

        let outcome = match catch_unwind(AssertUnwindSafe(callable)) {
            Ok(Ok(value)) => JobOutcome::Succeeded(value),
            Ok(Err(error)) => JobOutcome::Failed(JobFailure::new(error)),
            Err(payload) => JobOutcome::Failed(JobFailure::from_panic(payload)),
        };
        let succeeded = matches!(outcome, JobOutcome::Succeeded(_));

        *self.outcome.lock() = outcome;
        self.timer.lock().shutdown();
        Ok(succeeded)
    }

    /// The value the closure returned
    ///
    /// # Errors
    ///
    /// [`TaskError::NotStarted`] before the job finished running, or
    /// [`TaskError::Failed`] carrying the captured failure.
    pub fn result(&self) -> Result<T>
    where
        T: Clone,
    {
        self.outcome.lock().clone().into_result(self.id)
    }

    /// Consume the job and return its result without cloning
    ///
    /// # Errors
    ///
    /// Same as [`result`](TaskJob::result).
    pub fn into_result(self) -> Result<T> {
        self.outcome.into_inner().into_result(self.id)
    }

    /// The captured failure, if the job failed
    pub fn failure(&self) -> Option<JobFailure> {
        match &*self.outcome.lock() {
            JobOutcome::Failed(failure) => Some(failure.clone()),
            _ => None,
        }
    }

    /// Copy of the running timer
    pub fn running_timer(&self) -> TimeMeter {
        self.timer.lock().clone()
    }

    /// Where the job is in its lifecycle
    pub fn state(&self) -> JobState {
        match &*self.outcome.lock() {
            JobOutcome::Succeeded(_) => return JobState::Succeeded,
            JobOutcome::Failed(_) => return JobState::Failed,
            JobOutcome::NotStarted => {}
        }
        if self.timer.lock().started() {
            JobState::Running
        } else {
            JobState::Created
        }
    }
}

impl<T: Send + 'static> Job for TaskJob<T> {
    fn id(&self) -> JobId {
        self.id
    }

    fn run(&self) -> Result<bool> {
        TaskJob::run(self)
    }

    fn running_timer(&self) -> TimeMeter {
        TaskJob::running_timer(self)
    }

    fn state(&self) -> JobState {
        TaskJob::state(self)
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Display for TaskJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job{} {}", self.id, self.name)
    }
}

impl<T> fmt::Debug for TaskJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskJob")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
