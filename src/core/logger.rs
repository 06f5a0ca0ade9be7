//! Logger handle injected into the task pool
//!
//! The pool reports worker and lifecycle events through a [`PoolLogger`]
//! passed in at construction. [`LogFacade`] forwards to the `log` crate and is
//! the default; with the `tracing` feature, `TracingLogger` emits `tracing`
//! events instead.

use log::Level;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Default log target of the pool
pub const DEFAULT_TARGET: &str = "task_pool_engine::pool";

/// A leveled logger
pub trait PoolLogger: Send + Sync + fmt::Debug {
    /// Emit one message at `level`
    fn log(&self, level: Level, message: &str);

    /// Emit a debug message
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Emit an info message
    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Emit a warning
    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Emit an error
    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Shared handle to a logger
pub type SharedLogger = Arc<dyn PoolLogger>;

/// Forwards messages to the `log` facade
#[derive(Debug, Clone)]
pub struct LogFacade {
    target: String,
}

impl LogFacade {
    /// Create a facade logging under `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The log target
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

impl PoolLogger for LogFacade {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: self.target.as_str(), level, "{}", message);
    }
}

/// The process-wide default logger
pub fn default_logger() -> SharedLogger {
    static LOGGER: OnceLock<SharedLogger> = OnceLock::new();
    Arc::clone(LOGGER.get_or_init(|| Arc::new(LogFacade::default())))
}

/// Forwards messages to `tracing` events
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl PoolLogger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Error => tracing::error!(target: "task_pool_engine::pool", "{}", message),
            Level::Warn => tracing::warn!(target: "task_pool_engine::pool", "{}", message),
            Level::Info => tracing::info!(target: "task_pool_engine::pool", "{}", message),
            Level::Debug => tracing::debug!(target: "task_pool_engine::pool", "{}", message),
            Level::Trace => tracing::trace!(target: "task_pool_engine::pool", "{}", message),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Keeps every message for assertions
    #[derive(Debug, Default)]
    pub(crate) struct RecordingLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingLogger {
        pub(crate) fn records(&self) -> Vec<(Level, String)> {
            self.records.lock().clone()
        }
    }

    impl PoolLogger for RecordingLogger {
        fn log(&self, level: Level, message: &str) {
            self.records.lock().push((level, message.to_string()));
        }
    }
}
