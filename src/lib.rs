//! # Task Pool Engine
//!
//! A task execution engine: a fixed set of worker threads draining a FIFO
//! job queue, with delayed jobs, barriers and the small timing and locking
//! utilities the pool is built from.
//!
//! ## Features
//!
//! - **Task Pool**: Fixed worker count, optional bounded queue with blocking submission
//! - **Barriers**: Wait for every submitted job, then resume with fresh workers
//! - **Jobs**: Closures wrapped as run-once jobs that keep their result or failure
//! - **Delayed Jobs**: Jobs that wait out a renewable countdown before running
//! - **Meters**: Elapsed time, countdowns, monotonic and outcome counters
//! - **Named Locks**: One mutex per key, created on first use
//! - **Injected Clock and Logger**: Deterministic tests with a manual clock
//!
//! ## Quick Start
//!
//! ```rust
//! use task_pool_engine::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Create and start a task pool
//! let pool = TaskPool::with_workers(4)?;
//! pool.startup()?;
//!
//! // Submit jobs
//! let jobs = (0..10)
//!     .map(|i| pool.submit(move || Ok::<_, BoxError>(i * i)))
//!     .collect::<Result<Vec<_>>>()?;
//!
//! // Wait for all of them
//! pool.barrier()?;
//! assert_eq!(jobs[3].result()?, 9);
//! assert_eq!(pool.status_counter().success, 10);
//!
//! // Shutdown gracefully
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Task Pool Configuration
//!
//! ```rust
//! use task_pool_engine::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = TaskPoolConfig::new(8)
//!     .with_jobs(1000)
//!     .with_thread_name_prefix("my-worker");
//!
//! let pool = TaskPool::with_config(config)?;
//! pool.startup()?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Jobs
//!
//! ```rust
//! use task_pool_engine::prelude::*;
//! use std::sync::Arc;
//!
//! struct Ping {
//!     id: JobId,
//!     timer: TimeMeter,
//! }
//!
//! impl Job for Ping {
//!     fn id(&self) -> JobId {
//!         self.id
//!     }
//!
//!     fn run(&self) -> Result<bool> {
//!         Ok(true)
//!     }
//!
//!     fn running_timer(&self) -> TimeMeter {
//!         self.timer.clone()
//!     }
//!
//!     fn state(&self) -> JobState {
//!         JobState::Created
//!     }
//!
//!     fn job_type(&self) -> &str {
//!         "Ping"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let pool = TaskPool::with_workers(2)?;
//! # pool.startup()?;
//! pool.submit_job(Arc::new(Ping {
//!     id: 1000,
//!     timer: TimeMeter::new(false),
//! }))?;
//! # pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Pools log through the [`log`] facade under the `task_pool_engine::pool`
//! target unless given another [`PoolLogger`](crate::core::PoolLogger). With
//! the `tracing` feature, `TracingLogger` forwards to `tracing` instead.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod meter;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod sync;

pub use self::core::{BoxError, DelayTaskJob, Job, JobId, Result, TaskError, TaskJob};
pub use meter::{CountMeter, CountdownMeter, StatusCountMeter, TimeMeter};
pub use pool::{TaskPool, TaskPoolConfig};
pub use sync::NamedLock;
