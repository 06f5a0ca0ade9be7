//! Task pool and worker implementations

pub mod task_pool;
pub mod worker;

pub use task_pool::{PoolGuard, PoolStats, TaskPool, TaskPoolConfig};
pub use worker::Worker;
