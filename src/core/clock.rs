//! Time sources for meters and jobs
//!
//! Every meter reads its timestamps from one [`Clock`]. Timestamps are
//! seconds as `f64`. The default [`SystemClock`] is monotonic and anchored
//! at the wall-clock time of its first use, so values look like UNIX
//! timestamps while never going backwards. [`ManualClock`] only moves when
//! told to, which makes every duration computed from it deterministic.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// A source of timestamps in seconds
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current timestamp in seconds
    fn now(&self) -> f64;

    /// Block the calling thread for `seconds`
    ///
    /// Non-positive values return immediately. Values too large for a
    /// [`Duration`] sleep for [`Duration::MAX`].
    fn sleep(&self, seconds: f64) {
        if let Some(duration) = sleep_duration(seconds) {
            thread::sleep(duration);
        }
    }
}

// saturating conversion, `None` for nothing to wait
fn sleep_duration(seconds: f64) -> Option<Duration> {
    if seconds > 0.0 {
        Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX))
    } else {
        None
    }
}

/// Shared handle to a clock
pub type SharedClock = Arc<dyn Clock>;

/// Monotonic clock anchored at wall time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    fn anchor() -> &'static (Instant, f64) {
        static ANCHOR: OnceLock<(Instant, f64)> = OnceLock::new();
        ANCHOR.get_or_init(|| {
            let wall = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;
            (Instant::now(), wall)
        })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        let (instant, wall) = Self::anchor();
        wall + instant.elapsed().as_secs_f64()
    }
}

/// The process-wide default clock
pub fn system_clock() -> SharedClock {
    static CLOCK: OnceLock<SharedClock> = OnceLock::new();
    Arc::clone(CLOCK.get_or_init(|| Arc::new(SystemClock)))
}

/// A clock that only advances when asked to
///
/// [`Clock::sleep`] advances the clock by the requested amount instead of
/// blocking, so delayed jobs run instantly in virtual time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Create a manual clock reading `start`
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a shared manual clock reading `start`
    pub fn shared(start: f64) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            *self.now.lock() += seconds;
        }
    }

    /// Set the clock to an absolute value
    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }

    fn sleep(&self, seconds: f64) {
        self.advance(seconds);
    }
}
