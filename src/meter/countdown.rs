//! Countdown meter

use crate::core::clock::{system_clock, SharedClock};
use crate::meter::TimeMeter;
use std::ops::Deref;

/// A [`TimeMeter`] with a lifetime budget
///
/// The meter starts at construction. A lifetime of `0.0` means the budget is
/// unbounded: the countdown never expires and its downtime stays `0.0`.
#[derive(Debug, Clone)]
pub struct CountdownMeter {
    meter: TimeMeter,
    lifetime: f64,
}

impl CountdownMeter {
    /// Create a countdown on the system clock
    pub fn new(lifetime: f64) -> Self {
        Self::with_clock(system_clock(), lifetime)
    }

    /// Create a countdown reading `clock`
    ///
    /// Negative lifetimes are floored to `0.0`.
    pub fn with_clock(clock: SharedClock, lifetime: f64) -> Self {
        Self {
            meter: TimeMeter::with_clock(clock, true),
            lifetime: lifetime.max(0.0),
        }
    }

    /// Lifetime budget in seconds
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    /// Seconds left in the budget; negative once expired
    pub fn downtime(&self) -> f64 {
        if self.lifetime > 0.0 {
            self.lifetime - self.meter.runtime()
        } else {
            0.0
        }
    }

    /// Whether the budget has run out
    pub fn expired(&self) -> bool {
        self.lifetime > 0.0 && self.meter.runtime() > self.lifetime
    }

    /// Optionally replace the lifetime, then start counting again
    pub fn renew(&mut self, lifetime: Option<f64>) {
        if let Some(lifetime) = lifetime {
            self.lifetime = lifetime.max(0.0);
        }
        self.meter.restart();
    }

    /// Start counting again with the same lifetime
    pub fn reset(&mut self) {
        self.meter.restart();
    }

    /// Stop the underlying meter
    pub fn shutdown(&mut self) {
        self.meter.shutdown();
    }

    /// Block until the downtime reaches zero
    pub fn alarm(&self) {
        while self.meter.started() {
            let remaining = self.downtime();
            if remaining <= 0.0 {
                break;
            }
            self.meter.clock().sleep(remaining);
        }
    }
}

impl Deref for CountdownMeter {
    type Target = TimeMeter;

    fn deref(&self) -> &TimeMeter {
        &self.meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, ManualClock};
    use crate::meter::testing::SequenceClock;

    #[test]
    fn test_downtime() {
        let clock = SequenceClock::shared(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let countdown = CountdownMeter::with_clock(clock, 3.0);
        assert_eq!(countdown.created_time(), 1.0);
        assert_eq!(countdown.started_time(), 1.0);
        assert_eq!(countdown.stopped_time(), 0.0);
        assert_eq!(countdown.lifetime(), 3.0);
        assert_eq!(countdown.downtime(), 2.0);
        assert_eq!(countdown.downtime(), 1.0);
        assert_eq!(countdown.downtime(), 0.0);
        assert_eq!(countdown.downtime(), -1.0);
    }

    #[test]
    fn test_unbounded_lifetime() {
        // only the construction reads the clock
        let clock = SequenceClock::shared(&[1.0]);
        let countdown = CountdownMeter::with_clock(clock, 0.0);
        assert_eq!(countdown.lifetime(), 0.0);
        assert_eq!(countdown.downtime(), 0.0);
        assert!(!countdown.expired());
        assert!(!countdown.expired());
    }

    #[test]
    fn test_negative_lifetime_floors_to_zero() {
        let clock = ManualClock::shared(0.0);
        let countdown = CountdownMeter::with_clock(clock, -4.0);
        assert_eq!(countdown.lifetime(), 0.0);
    }

    #[test]
    fn test_expired() {
        let clock = SequenceClock::shared(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let countdown = CountdownMeter::with_clock(clock, 3.0);
        assert!(!countdown.expired());
        assert!(!countdown.expired());
        assert!(!countdown.expired());
        assert!(countdown.expired());
    }

    #[test]
    fn test_reset_rearms() {
        let clock = SequenceClock::shared(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut countdown = CountdownMeter::with_clock(clock, 1.0);
        assert_eq!(countdown.downtime(), 0.0);
        countdown.reset();
        assert_eq!(countdown.created_time(), 1.0);
        assert_eq!(countdown.started_time(), 3.0);
        assert_eq!(countdown.stopped_time(), 0.0);
        assert_eq!(countdown.downtime(), 0.0);
        countdown.reset();
        assert_eq!(countdown.started_time(), 5.0);
        assert_eq!(countdown.lifetime(), 1.0);
        assert_eq!(countdown.downtime(), 0.0);
    }

    #[test]
    fn test_renew() {
        let clock = SequenceClock::shared(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut countdown = CountdownMeter::with_clock(clock, 1.0);
        assert_eq!(countdown.downtime(), 0.0);
        countdown.renew(Some(2.0));
        assert_eq!(countdown.created_time(), 1.0);
        assert_eq!(countdown.started_time(), 3.0);
        assert_eq!(countdown.lifetime(), 2.0);
        assert_eq!(countdown.downtime(), 1.0);
        countdown.renew(None);
        assert_eq!(countdown.started_time(), 5.0);
        assert_eq!(countdown.lifetime(), 2.0);
        assert_eq!(countdown.downtime(), 1.0);
    }

    #[test]
    fn test_renew_after_shutdown_restarts() {
        let clock = ManualClock::shared(0.0);
        let mut countdown = CountdownMeter::with_clock(clock.clone(), 2.0);
        clock.advance(1.0);
        countdown.shutdown();
        assert!(countdown.stopped());
        countdown.renew(None);
        assert!(countdown.started());
        assert!(!countdown.stopped());
        assert_eq!(countdown.downtime(), 2.0);
    }

    #[test]
    fn test_alarm() {
        let clock = ManualClock::shared(0.0);
        let countdown = CountdownMeter::with_clock(clock.clone(), 3.0);
        clock.advance(1.0);
        countdown.alarm();
        assert_eq!(clock.now(), 3.0);
        assert!(countdown.downtime() <= 0.0);
    }
}
