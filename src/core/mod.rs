//! Core types and traits for the task engine

pub mod clock;
pub mod delay_job;
pub mod error;
pub mod job;
pub mod logger;

pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use delay_job::{DelayTaskJob, MIN_DELAY};
pub use error::{BoxError, JobFailure, Result, TaskError};
pub use job::{Job, JobId, JobOutcome, JobState, TaskJob, UNASSIGNED_JOB_ID};
#[cfg(feature = "tracing")]
pub use logger::TracingLogger;
pub use logger::{default_logger, LogFacade, PoolLogger, SharedLogger};
