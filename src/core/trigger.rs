//! Scroll-driven trigger decisions
//!
//! Pure helpers with no clock or I/O of their own. The controller passes in
//! raw scroll samples and the current instant, and asks whether a
//! continuation fetch is warranted.

use std::time::{Duration, Instant};

/// Proximity to the document bottom that counts as "near the end"
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 200.0;

/// A window scroll sample, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top of the document
    pub offset: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
    /// Total height of the document
    pub document_height: f64,
}

impl ScrollPosition {
    pub fn new(offset: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            offset,
            viewport_height,
            document_height,
        }
    }

    /// Remaining distance below the viewport; never negative
    pub fn distance_to_bottom(&self) -> f64 {
        (self.document_height - (self.offset + self.viewport_height)).max(0.0)
    }

    /// Whether the bottom of the viewport is within `threshold` pixels of the end
    #[inline]
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.distance_to_bottom() <= threshold
    }
}

/// Limits how often scroll samples are evaluated
///
/// A zero interval admits every sample.
#[derive(Debug, Clone)]
pub struct ScrollThrottle {
    interval: Duration,
    last_sampled: Option<Instant>,
}

impl ScrollThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sampled: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Records a sample at `now` if the interval has elapsed since the last one
    pub fn admit(&mut self, now: Instant) -> bool {
        if self
            .last_sampled
            .is_some_and(|last| now.saturating_duration_since(last) < self.interval)
        {
            return false;
        }

        self.last_sampled = Some(now);
        true
    }

    /// Forgets the last sample so the next one is always admitted
    pub fn reset(&mut self) {
        self.last_sampled = None;
    }
}

impl Default for ScrollThrottle {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 800.0, 2000.0, 1200.0)]
    #[case(1000.0, 800.0, 2000.0, 200.0)]
    #[case(1200.0, 800.0, 2000.0, 0.0)]
    #[case(1500.0, 800.0, 2000.0, 0.0)] // overscroll
    #[case(0.0, 800.0, 500.0, 0.0)] // document shorter than viewport
    fn test_distance_to_bottom(
        #[case] offset: f64,
        #[case] viewport: f64,
        #[case] document: f64,
        #[case] expected: f64,
    ) {
        let position = ScrollPosition::new(offset, viewport, document);
        assert_eq!(position.distance_to_bottom(), expected);
    }

    #[rstest]
    #[case(999.0, false)]
    #[case(1000.0, true)]
    #[case(1100.0, true)]
    #[case(0.0, false)]
    fn test_is_near_bottom(#[case] offset: f64, #[case] expected: bool) {
        let position = ScrollPosition::new(offset, 800.0, 2000.0);
        assert_eq!(
            position.is_near_bottom(DEFAULT_SCROLL_THRESHOLD_PX),
            expected
        );
    }

    #[test]
    fn test_throttle_zero_interval_admits_everything() {
        let mut throttle = ScrollThrottle::default();
        let now = Instant::now();
        assert!(throttle.admit(now));
        assert!(throttle.admit(now));
        assert!(throttle.admit(now));
    }

    #[test]
    fn test_throttle_limits_samples_within_interval() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(100));
        let start = Instant::now();

        assert!(throttle.admit(start));
        assert!(!throttle.admit(start + Duration::from_millis(10)));
        assert!(!throttle.admit(start + Duration::from_millis(99)));
        assert!(throttle.admit(start + Duration::from_millis(100)));
        assert!(!throttle.admit(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = ScrollThrottle::new(Duration::from_secs(60));
        let now = Instant::now();

        assert!(throttle.admit(now));
        assert!(!throttle.admit(now));
        throttle.reset();
        assert!(throttle.admit(now));
    }
}
