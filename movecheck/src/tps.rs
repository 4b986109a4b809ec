//! Estimating the server's tick rate from the intervals between its ticks.

use core::time::Duration;
use std::collections::VecDeque;

use crate::config::Uncertainty;
use crate::math::FreeCoordinate;

/// Estimates the server's ticks per second, for [`Engine::set_tps()`](crate::Engine::set_tps).
///
/// The host calls [`record_interval()`](Self::record_interval) with the time elapsed
/// between consecutive server ticks (or between time updates received from the server).
/// The estimate is the reciprocal of the mean of the most recent intervals.
///
/// ```
/// use core::time::Duration;
/// use movecheck::tps::TpsTracker;
///
/// let mut tracker = TpsTracker::new();
/// assert_eq!(tracker.tps(), 20.0);
/// for _ in 0..40 {
///     tracker.record_interval(Duration::from_millis(100));
/// }
/// assert_eq!(tracker.tps(), 10.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TpsTracker {
    intervals: VecDeque<Duration>,
    sum: Duration,
}

impl TpsTracker {
    /// Number of intervals averaged over; two seconds at the nominal rate.
    pub const SAMPLES: usize = 40;

    /// Fewer intervals than this are not enough for an estimate.
    const MIN_SAMPLES: usize = Self::SAMPLES / 2;

    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the time between two consecutive server ticks.
    pub fn record_interval(&mut self, interval: Duration) {
        if self.intervals.len() >= Self::SAMPLES {
            if let Some(oldest) = self.intervals.pop_front() {
                self.sum -= oldest;
            }
        }
        self.intervals.push_back(interval);
        self.sum += interval;
    }

    /// Estimated ticks per second.
    ///
    /// Returns the nominal rate until enough intervals have been recorded, and never
    /// more than it, since a server does not run ahead of schedule.
    pub fn tps(&self) -> FreeCoordinate {
        if self.intervals.len() < Self::MIN_SAMPLES || self.sum.is_zero() {
            return Uncertainty::TARGET_TPS;
        }
        let mean = self.sum.as_secs_f64() / self.intervals.len() as f64;
        mean.recip().min(Uncertainty::TARGET_TPS)
    }

    /// Forgets all recorded intervals, such as after reconnecting.
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.sum = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_until_enough_samples() {
        let mut tracker = TpsTracker::new();
        for _ in 0..TpsTracker::MIN_SAMPLES - 1 {
            tracker.record_interval(Duration::from_millis(200));
        }
        assert_eq!(tracker.tps(), 20.0);
        tracker.record_interval(Duration::from_millis(200));
        assert_eq!(tracker.tps(), 5.0);
    }

    #[test]
    fn oldest_samples_are_dropped() {
        let mut tracker = TpsTracker::new();
        for _ in 0..TpsTracker::SAMPLES {
            tracker.record_interval(Duration::from_millis(200));
        }
        for _ in 0..TpsTracker::SAMPLES {
            tracker.record_interval(Duration::from_millis(80));
        }
        assert!((tracker.tps() - 12.5).abs() < 1e-9, "{}", tracker.tps());
    }

    #[test]
    fn never_above_nominal() {
        let mut tracker = TpsTracker::new();
        for _ in 0..TpsTracker::SAMPLES {
            tracker.record_interval(Duration::from_millis(10));
        }
        assert_eq!(tracker.tps(), 20.0);
        tracker.clear();
        assert_eq!(tracker, TpsTracker::new());
    }
}
