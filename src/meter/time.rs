//! Elapsed-time meter

use crate::core::clock::{system_clock, SharedClock};
use serde::{Deserialize, Serialize};

/// Tracks creation, start and stop timestamps of a unit of work
///
/// All timestamps come from the clock given at construction. Timestamps that
/// were never set read as `0.0`.
///
/// # Example
///
/// ```rust
/// use task_pool_engine::core::ManualClock;
/// use task_pool_engine::meter::TimeMeter;
///
/// let clock = ManualClock::shared(10.0);
/// let mut timer = TimeMeter::with_clock(clock.clone(), false);
/// assert_eq!(timer.runtime(), 0.0);
///
/// timer.startup();
/// clock.advance(1.5);
/// timer.shutdown();
/// assert_eq!(timer.runtime(), 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct TimeMeter {
    clock: SharedClock,
    created: f64,
    started: Option<f64>,
    stopped: Option<f64>,
    running: bool,
}

impl TimeMeter {
    /// Create a meter on the system clock, optionally started right away
    pub fn new(start: bool) -> Self {
        Self::with_clock(system_clock(), start)
    }

    /// Create a meter reading `clock`, optionally started right away
    ///
    /// A meter started at construction shares its creation timestamp.
    pub fn with_clock(clock: SharedClock, start: bool) -> Self {
        let now = clock.now();
        Self {
            clock,
            created: now,
            started: start.then_some(now),
            stopped: None,
            running: start,
        }
    }

    /// The clock this meter reads
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Creation timestamp
    pub fn created_time(&self) -> f64 {
        self.created
    }

    /// Start timestamp, `0.0` if not started
    pub fn started_time(&self) -> f64 {
        self.started.unwrap_or(0.0)
    }

    /// Stop timestamp, `0.0` if not stopped
    pub fn stopped_time(&self) -> f64 {
        self.stopped.unwrap_or(0.0)
    }

    /// Whether the meter is currently running
    pub fn started(&self) -> bool {
        self.running
    }

    /// Whether the meter has a stop timestamp
    pub fn stopped(&self) -> bool {
        self.stopped.is_some()
    }

    /// Whether the meter carries a start timestamp
    pub fn has_started(&self) -> bool {
        self.started.is_some()
    }

    /// Elapsed seconds between start and stop (or now while running)
    pub fn runtime(&self) -> f64 {
        let Some(started) = self.started else {
            return 0.0;
        };
        let end = if self.running {
            self.clock.now()
        } else {
            self.stopped.unwrap_or(started)
        };
        (end - started).max(0.0)
    }

    /// Start the meter; no-op while running
    pub fn startup(&mut self) {
        if !self.running {
            self.restart();
        }
    }

    /// Stop the meter; no-op unless running
    pub fn shutdown(&mut self) {
        if self.running {
            self.stopped = Some(self.clock.now());
            self.running = false;
        }
    }

    /// Start the meter again even if it is running
    pub fn restart(&mut self) {
        self.started = Some(self.clock.now());
        self.stopped = None;
        self.running = true;
    }

    /// Forget the start and stop timestamps
    pub fn reset(&mut self) {
        self.started = None;
        self.stopped = None;
        self.running = false;
    }

    /// Block until the meter has been running for `seconds`
    ///
    /// Returns at once when the meter is not running.
    pub fn alarm(&self, seconds: f64) {
        while self.running {
            let remaining = seconds - self.runtime();
            if remaining <= 0.0 {
                break;
            }
            self.clock.sleep(remaining);
        }
    }

    /// Serializable copy of the current readings
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            created: self.created_time(),
            started: self.started_time(),
            stopped: self.stopped_time(),
            running: self.running,
            runtime: self.runtime(),
        }
    }
}

/// Readings of a [`TimeMeter`] at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    /// Creation timestamp
    pub created: f64,
    /// Start timestamp (`0.0` if unset)
    pub started: f64,
    /// Stop timestamp (`0.0` if unset)
    pub stopped: f64,
    /// Whether the meter was running
    pub running: bool,
    /// Elapsed seconds
    pub runtime: f64,
}
