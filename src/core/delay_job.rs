//! Task job that waits out a delay before running

use crate::core::clock::{system_clock, SharedClock};
use crate::core::error::{BoxError, Result, TaskError};
use crate::core::job::{Job, JobId, JobState, TaskJob, UNASSIGNED_JOB_ID};
use crate::meter::{CountdownMeter, TimeMeter};
use parking_lot::Mutex;
use std::fmt;
use std::ops::Deref;

/// Shortest delay a delayed job accepts, in seconds
pub const MIN_DELAY: f64 = 1.0;

// longest single sleep while waiting, so a renewed countdown is seen promptly
const WAIT_STEP: f64 = 1.0;

fn floor_delay(delay: f64) -> f64 {
    delay.max(MIN_DELAY)
}

/// A [`TaskJob`] that runs only after its delay has elapsed
///
/// The delay countdown starts when the job is built. Running the job blocks
/// the calling thread for whatever is left of it. [`renew`](DelayTaskJob::renew)
/// restarts the countdown, pushing execution back or, with a shorter delay,
/// bringing it forward. The wait sleeps in steps of at most one second, so
/// even an infinite delay can be cut short by a renew.
///
/// Everything else (id, result, running timer) comes from the wrapped
/// [`TaskJob`] through `Deref`.
pub struct DelayTaskJob<T> {
    job: TaskJob<T>,
    clock: SharedClock,
    delay_timer: Mutex<CountdownMeter>,
}

impl<T: Send + 'static> DelayTaskJob<T> {
    /// Create a delayed job with `id` on the system clock
    pub fn new<F, E>(delay: f64, id: JobId, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::with_clock(delay, id, system_clock(), f)
    }

    /// Create a delayed job with `id` whose timers read `clock`
    ///
    /// `delay` is floored to [`MIN_DELAY`].
    pub fn with_clock<F, E>(delay: f64, id: JobId, clock: SharedClock, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        // the running timer is created first so the delay is measured from
        // no earlier than the job's creation
        let job = TaskJob::with_clock(id, clock.clone(), f).with_name("DelayTaskJob");
        let delay_timer = CountdownMeter::with_clock(clock.clone(), floor_delay(delay));
        Self {
            job,
            clock,
            delay_timer: Mutex::new(delay_timer),
        }
    }

    /// Create a delayed job to run directly, outside any pool
    pub fn create<F, E>(delay: f64, f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::new(delay, UNASSIGNED_JOB_ID, f)
    }
}

impl<T> DelayTaskJob<T> {
    /// Give the job a custom name
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.job = self.job.with_name(name);
        self
    }

    /// Current delay in seconds
    pub fn delay_time(&self) -> f64 {
        self.delay_timer.lock().lifetime()
    }

    /// Copy of the delay countdown
    pub fn delay_timer(&self) -> CountdownMeter {
        self.delay_timer.lock().clone()
    }

    /// Restart the delay countdown, optionally with a new delay
    ///
    /// Has no effect on a job whose wait already finished.
    pub fn renew(&self, delay: Option<f64>) {
        self.delay_timer.lock().renew(delay.map(floor_delay));
    }

    /// Wait out the remaining delay, then run the job
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AlreadyStarted`] without waiting if the job was
    /// run before.
    pub fn run(&self) -> Result<bool> {
        if self.job.running_timer().has_started() {
            return Err(TaskError::already_started(self.job.id()));
        }

        loop {
            // renew may change the countdown while we sleep
            let remaining = self.delay_timer.lock().downtime();
            if remaining <= 0.0 {
                break;
            }
            let before = self.clock.now();
            self.clock.sleep(remaining.min(WAIT_STEP));
            // a clock that stands still would never expire the delay
            if self.clock.now() <= before {
                break;
            }
        }

        self.job.run()
    }

    /// The wrapped task job
    pub fn task(&self) -> &TaskJob<T> {
        &self.job
    }
}

impl<T> Deref for DelayTaskJob<T> {
    type Target = TaskJob<T>;

    fn deref(&self) -> &TaskJob<T> {
        &self.job
    }
}

impl<T: Send + 'static> Job for DelayTaskJob<T> {
    fn id(&self) -> JobId {
        self.job.id()
    }

    fn run(&self) -> Result<bool> {
        DelayTaskJob::run(self)
    }

    fn running_timer(&self) -> TimeMeter {
        self.job.running_timer()
    }

    fn state(&self) -> JobState {
        self.job.state()
    }

    fn job_type(&self) -> &str {
        self.job.name()
    }
}

impl<T> fmt::Display for DelayTaskJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (delay {}s)", self.job, self.delay_time())
    }
}

impl<T> fmt::Debug for DelayTaskJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayTaskJob")
            .field("job", &self.job)
            .field("delay", &self.delay_time())
            .finish()
    }
}
