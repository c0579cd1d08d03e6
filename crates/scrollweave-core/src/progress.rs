#![forbid(unsafe_code)]

//! Progress mapping: scroll offset → `[0, 1]`.
//!
//! # Invariants
//!
//! 1. An [`Interval`] always has finite `start < end`.
//! 2. [`Interval::progress`] is clamped to `[0, 1]` and monotonic
//!    non-decreasing in `scroll_y`.
//! 3. [`ScrubSmoother`] never changes the mapped progress, only the applied
//!    value that trails it.

use std::time::Duration;

/// Progress closer than this to its target snaps onto it.
const SNAP_EPSILON: f64 = 1e-4;

/// A resolved, non-empty scroll interval in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: f64,
    end: f64,
}

impl Interval {
    /// `None` unless both ends are finite and `start < end`.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start < end).then_some(Self { start, end })
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// `clamp((scroll_y − start) / (end − start), 0, 1)`.
    #[inline]
    #[must_use]
    pub fn progress(&self, scroll_y: f64) -> f64 {
        if scroll_y.is_nan() {
            return 0.0;
        }
        ((scroll_y - self.start) / self.length()).clamp(0.0, 1.0)
    }

    /// Whether `scroll_y` lies inside the closed interval.
    #[inline]
    #[must_use]
    pub fn contains(&self, scroll_y: f64) -> bool {
        (self.start..=self.end).contains(&scroll_y)
    }
}

/// Applied progress that trails its target with exponential decay.
///
/// With no lag the applied value equals the target every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubSmoother {
    lag: Option<Duration>,
    applied: Option<f64>,
}

impl ScrubSmoother {
    #[must_use]
    pub const fn new(lag: Option<Duration>) -> Self {
        Self { lag, applied: None }
    }

    #[must_use]
    pub fn lag(&self) -> Option<Duration> {
        self.lag
    }

    /// Last applied value, if any frame has been stepped.
    #[must_use]
    pub fn applied(&self) -> Option<f64> {
        self.applied
    }

    /// Whether the applied value still trails `target`.
    #[must_use]
    pub fn is_settling(&self, target: f64) -> bool {
        self.applied.is_some_and(|a| a != target)
    }

    /// Advance toward `target` by `dt` and return the new applied value.
    ///
    /// The first step jumps straight to the target.
    pub fn step(&mut self, target: f64, dt: Duration) -> f64 {
        let next = match (self.applied, self.lag) {
            (None, _) | (_, None) => target,
            (Some(_), Some(lag)) if lag.is_zero() => target,
            (Some(applied), Some(lag)) => {
                let alpha = 1.0 - (-dt.as_secs_f64() / lag.as_secs_f64()).exp();
                let v = applied + (target - applied) * alpha;
                if (target - v).abs() < SNAP_EPSILON { target } else { v }
            }
        };
        self.applied = Some(next);
        next
    }

    /// Forget the applied value so the next step jumps to its target.
    pub fn reset(&mut self) {
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_empty_and_inverted() {
        assert!(Interval::new(10.0, 10.0).is_none());
        assert!(Interval::new(20.0, 10.0).is_none());
        assert!(Interval::new(f64::NAN, 10.0).is_none());
        assert!(Interval::new(0.0, f64::INFINITY).is_none());
        assert!(Interval::new(0.0, 1.0).is_some());
    }

    #[test]
    fn progress_matches_reference_points() {
        let i = Interval::new(1000.0, 1800.0).unwrap();
        assert_eq!(i.progress(1000.0), 0.0);
        assert_eq!(i.progress(1400.0), 0.5);
        assert_eq!(i.progress(2000.0), 1.0);
        assert_eq!(i.progress(500.0), 0.0);
        assert_eq!(i.progress(f64::NAN), 0.0);
    }

    #[test]
    fn contains_is_closed() {
        let i = Interval::new(0.0, 10.0).unwrap();
        assert!(i.contains(0.0));
        assert!(i.contains(10.0));
        assert!(!i.contains(10.5));
    }

    #[test]
    fn smoother_without_lag_tracks_target() {
        let mut s = ScrubSmoother::new(None);
        assert_eq!(s.step(0.4, Duration::from_millis(16)), 0.4);
        assert_eq!(s.step(0.9, Duration::from_millis(16)), 0.9);
        assert!(!s.is_settling(0.9));
    }

    #[test]
    fn smoother_trails_then_snaps() {
        let mut s = ScrubSmoother::new(Some(Duration::from_millis(300)));
        assert_eq!(s.step(0.0, Duration::ZERO), 0.0);
        let first = s.step(1.0, Duration::from_millis(16));
        assert!(first > 0.0 && first < 0.2, "{first}");
        assert!(s.is_settling(1.0));

        let mut last = first;
        for _ in 0..200 {
            last = s.step(1.0, Duration::from_millis(16));
        }
        assert_eq!(last, 1.0);
        assert!(!s.is_settling(1.0));
    }

    #[test]
    fn smoother_reset_jumps() {
        let mut s = ScrubSmoother::new(Some(Duration::from_secs(1)));
        s.step(0.0, Duration::ZERO);
        s.reset();
        assert_eq!(s.applied(), None);
        assert_eq!(s.step(0.7, Duration::from_millis(16)), 0.7);
    }
}
