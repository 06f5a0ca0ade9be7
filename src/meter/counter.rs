//! Thread-safe counters

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Increment-only counter starting at zero
#[derive(Debug, Default)]
pub struct CountMeter {
    value: AtomicU64,
}

impl CountMeter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one and return the new value
    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current value
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Success, failure and total tallies at one instant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSnapshot {
    /// Successful jobs
    pub success: u64,
    /// Failed jobs
    pub failure: u64,
    /// All jobs, always `success + failure`
    pub total: u64,
}

impl OutcomeSnapshot {
    /// Success rate as a percentage (0.0 to 100.0)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}

/// Counts job outcomes
///
/// Both tallies move together with the total under one lock, so a
/// snapshot always satisfies `total == success + failure`.
#[derive(Debug, Default)]
pub struct StatusCountMeter {
    tally: Mutex<OutcomeSnapshot>,
}

impl StatusCountMeter {
    /// Create a counter with all tallies at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome and return the tallies after it
    pub fn increment(&self, ok: bool) -> OutcomeSnapshot {
        let mut tally = self.tally.lock();
        if ok {
            tally.success += 1;
        } else {
            tally.failure += 1;
        }
        tally.total += 1;
        *tally
    }

    /// Successful jobs
    pub fn success(&self) -> u64 {
        self.tally.lock().success
    }

    /// Failed jobs
    pub fn failure(&self) -> u64 {
        self.tally.lock().failure
    }

    /// All jobs
    pub fn total(&self) -> u64 {
        self.tally.lock().total
    }

    /// Consistent copy of all three tallies
    pub fn snapshot(&self) -> OutcomeSnapshot {
        *self.tally.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_count_meter_returns_post_increment() {
        let counter = CountMeter::new();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_count_meter_concurrent_values_are_unique() {
        let counter = Arc::new(CountMeter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..250).map(|_| counter.increment()).collect::<Vec<_>>())
            })
            .collect();

        let mut values: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("Thread panicked"))
            .collect();
        values.sort_unstable();
        assert_eq!(values, (1..=2000).collect::<Vec<u64>>());
    }

    #[test]
    fn test_status_count_meter() {
        let status = StatusCountMeter::new();
        status.increment(true);
        status.increment(false);
        let after = status.increment(true);

        assert_eq!(after, OutcomeSnapshot { success: 2, failure: 1, total: 3 });
        assert_eq!(status.success(), 2);
        assert_eq!(status.failure(), 1);
        assert_eq!(status.total(), 3);
    }

    #[test]
    fn test_status_count_meter_concurrent() {
        let status = Arc::new(StatusCountMeter::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let status = Arc::clone(&status);
                thread::spawn(move || {
                    for j in 0..100 {
                        let snapshot = status.increment((i + j) % 3 != 0);
                        assert_eq!(snapshot.total, snapshot.success + snapshot.failure);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let snapshot = status.snapshot();
        assert_eq!(snapshot.total, 400);
        assert_eq!(snapshot.success + snapshot.failure, 400);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(OutcomeSnapshot::default().success_rate(), 100.0);
        let snapshot = OutcomeSnapshot { success: 3, failure: 1, total: 4 };
        assert_eq!(snapshot.success_rate(), 75.0);
    }
}
