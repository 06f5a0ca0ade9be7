//! Error types for the task engine

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::core::job::JobId;

/// Result type for task engine operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Boxed error accepted from job callables
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A captured failure of a job callable.
///
/// The failure is shared so that every read of a failed job's result
/// returns the same underlying error.
#[derive(Clone)]
pub struct JobFailure(Arc<dyn StdError + Send + Sync + 'static>);

impl JobFailure {
    /// Wrap an error returned by a job callable
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(Arc::from(error.into()))
    }

    /// Build a failure from a caught panic payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self::new(format!("job panicked: {}", message))
    }

    /// The captured error
    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Whether two failures share the same captured error
    pub fn ptr_eq(&self, other: &JobFailure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for JobFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// Errors that can occur in the task engine
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TaskError {
    /// The job has not run yet, so it has no result
    #[error("Job{job_id} is not started")]
    NotStarted {
        /// ID of the job
        job_id: JobId,
    },

    /// The job callable returned an error or panicked
    #[error("Job{job_id} failed: {source}")]
    Failed {
        /// ID of the failed job
        job_id: JobId,
        /// Captured callable failure
        #[source]
        source: JobFailure,
    },

    /// The job was already started once
    #[error("Job{job_id} is already started")]
    AlreadyStarted {
        /// ID of the job
        job_id: JobId,
    },

    /// The job id is not a positive pool id
    #[error("Job{job_id} id is invalid")]
    InvalidJobId {
        /// Offending id
        job_id: JobId,
    },

    /// A job with the same id is already registered in the pool
    #[error("Job{job_id} id is already in pool")]
    DuplicateJob {
        /// Offending id
        job_id: JobId,
    },

    /// A job was still queued after every worker exited
    #[error("Unexecuted job: Job{job_id}")]
    UnexecutedJob {
        /// ID of the leftover job
        job_id: JobId,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn task thread '{thread_name}': {message}")]
    SpawnError {
        /// Name of the thread that failed to spawn
        thread_name: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Failed to join a worker thread
    #[error("Failed to join task thread '{thread_name}': {message}")]
    JoinError {
        /// Name of the thread that failed to join
        thread_name: String,
        /// Error message
        message: String,
    },

    /// The job queue lost its other end
    #[error("Job queue is disconnected")]
    QueueDisconnected,

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },
}

impl TaskError {
    /// Create a not started error
    pub fn not_started(job_id: JobId) -> Self {
        TaskError::NotStarted { job_id }
    }

    /// Create a job failure error
    pub fn failed(job_id: JobId, source: JobFailure) -> Self {
        TaskError::Failed { job_id, source }
    }

    /// Create an already started error
    pub fn already_started(job_id: JobId) -> Self {
        TaskError::AlreadyStarted { job_id }
    }

    /// Create an invalid job id error
    pub fn invalid_job_id(job_id: JobId) -> Self {
        TaskError::InvalidJobId { job_id }
    }

    /// Create a duplicate job error
    pub fn duplicate_job(job_id: JobId) -> Self {
        TaskError::DuplicateJob { job_id }
    }

    /// Create an unexecuted job error
    pub fn unexecuted_job(job_id: JobId) -> Self {
        TaskError::UnexecutedJob { job_id }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(thread_name: impl Into<String>, source: std::io::Error) -> Self {
        TaskError::SpawnError {
            thread_name: thread_name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(thread_name: impl Into<String>, message: impl Into<String>) -> Self {
        TaskError::JoinError {
            thread_name: thread_name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        TaskError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Whether this error reports a misuse of the API rather than a job failure
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TaskError::AlreadyStarted { .. }
                | TaskError::InvalidJobId { .. }
                | TaskError::DuplicateJob { .. }
                | TaskError::UnexecutedJob { .. }
        )
    }

    /// The captured callable failure, if this is one
    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            TaskError::Failed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TaskError::already_started(3);
        assert!(matches!(err, TaskError::AlreadyStarted { job_id: 3 }));
        assert!(err.is_usage_error());

        let err = TaskError::not_started(-1);
        assert!(matches!(err, TaskError::NotStarted { .. }));
        assert!(!err.is_usage_error());

        let err = TaskError::failed(7, JobFailure::new("boom"));
        assert!(!err.is_usage_error());
        assert_eq!(err.failure().map(|f| f.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TaskError::not_started(-1).to_string(),
            "Job-1 is not started"
        );
        assert_eq!(
            TaskError::duplicate_job(12).to_string(),
            "Job12 id is already in pool"
        );
        assert_eq!(
            TaskError::failed(4, JobFailure::new("disk full")).to_string(),
            "Job4 failed: disk full"
        );
    }

    #[test]
    fn test_spawn_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = TaskError::spawn_with_source("task_5", io_err);

        assert!(matches!(err, TaskError::SpawnError { .. }));
        assert!(err.to_string().contains("'task_5'"));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_panic_payload_message() {
        let failure = JobFailure::from_panic(Box::new("exploded"));
        assert_eq!(failure.to_string(), "job panicked: exploded");

        let failure = JobFailure::from_panic(Box::new(String::from("owned")));
        assert_eq!(failure.to_string(), "job panicked: owned");

        let failure = JobFailure::from_panic(Box::new(42u8));
        assert_eq!(failure.to_string(), "job panicked: Unknown panic");
    }

    #[test]
    fn test_failure_clone_shares_error() {
        let failure = JobFailure::new("shared");
        let copy = failure.clone();
        assert!(failure.ptr_eq(&copy));
        assert!(!failure.ptr_eq(&JobFailure::new("shared")));
    }
}
