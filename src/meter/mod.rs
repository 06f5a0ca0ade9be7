//! Timing meters and counters
//!
//! - [`TimeMeter`]: created/started/stopped timestamps and runtime
//! - [`CountdownMeter`]: a time meter with a lifetime budget
//! - [`CountMeter`]: monotonic counter used for job ids
//! - [`StatusCountMeter`]: success/failure/total tallies

mod countdown;
mod counter;
mod time;

pub use countdown::CountdownMeter;
pub use counter::{CountMeter, OutcomeSnapshot, StatusCountMeter};
pub use time::{MeterSnapshot, TimeMeter};

#[cfg(test)]
pub(crate) mod testing {
    use crate::core::Clock;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Returns a fixed sequence of timestamps, one per read
    #[derive(Debug)]
    pub(crate) struct SequenceClock {
        values: Mutex<VecDeque<f64>>,
    }

    impl SequenceClock {
        pub(crate) fn shared(values: &[f64]) -> Arc<Self> {
            Arc::new(Self {
                values: Mutex::new(values.iter().copied().collect()),
            })
        }
    }

    impl Clock for SequenceClock {
        fn now(&self) -> f64 {
            self.values
                .lock()
                .pop_front()
                .expect("clock read more often than expected")
        }
    }
}
