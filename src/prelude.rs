//! Convenient re-exports for common types and traits

pub use crate::core::{
    BoxError, Clock, DelayTaskJob, Job, JobId, JobState, LogFacade, ManualClock, PoolLogger,
    Result, TaskError, TaskJob,
};
pub use crate::meter::{CountMeter, CountdownMeter, StatusCountMeter, TimeMeter};
pub use crate::pool::{PoolGuard, PoolStats, TaskPool, TaskPoolConfig};
pub use crate::sync::NamedLock;
