//! Last-value-wins throttle for bursty input signals.

use std::time::Duration;

/// Accepts at most one sample per interval
///
/// The first sample after a quiet period is accepted immediately. Samples that
/// arrive inside the interval are parked, each one replacing the previous, and
/// the survivor is handed back by [`SignalThrottle::flush`] once the interval
/// has elapsed. Intermediate samples are dropped, never queued.
#[derive(Debug, Clone)]
pub struct SignalThrottle<T> {
    interval: Duration,
    last_accepted: Option<Duration>,
    parked: Option<T>,
}

impl<T> SignalThrottle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
            parked: None,
        }
    }

    #[inline]
    fn window_open(&self, now: Duration) -> bool {
        match self.last_accepted {
            None => true,
            Some(at) => now.saturating_sub(at) >= self.interval,
        }
    }

    /// Offer a sample; returns it back if it should be applied right away
    pub fn offer(&mut self, now: Duration, sample: T) -> Option<T> {
        if self.window_open(now) {
            self.last_accepted = Some(now);
            // A newer sample supersedes whatever was parked
            self.parked = None;
            Some(sample)
        } else {
            self.parked = Some(sample);
            None
        }
    }

    /// Release the parked sample if its interval has elapsed
    pub fn flush(&mut self, now: Duration) -> Option<T> {
        if self.parked.is_some() && self.window_open(now) {
            self.last_accepted = Some(now);
            return self.parked.take();
        }
        None
    }

    #[inline]
    pub fn has_parked(&self) -> bool {
        self.parked.is_some()
    }

    /// The parked sample, for callers that need to patch it before release
    pub fn parked_mut(&mut self) -> Option<&mut T> {
        self.parked.as_mut()
    }

    /// Drop any parked sample and forget the last acceptance time
    pub fn clear(&mut self) {
        self.parked = None;
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_sample_passes() {
        let mut throttle = SignalThrottle::new(ms(16));
        assert_eq!(throttle.offer(ms(0), 1), Some(1));
    }

    #[test]
    fn test_burst_keeps_only_latest() {
        let mut throttle = SignalThrottle::new(ms(16));
        assert_eq!(throttle.offer(ms(0), 1), Some(1));
        assert_eq!(throttle.offer(ms(4), 2), None);
        assert_eq!(throttle.offer(ms(8), 3), None);
        assert_eq!(throttle.offer(ms(12), 4), None);
        assert!(throttle.has_parked());

        assert_eq!(throttle.flush(ms(15)), None);
        assert_eq!(throttle.flush(ms(16)), Some(4));
        assert_eq!(throttle.flush(ms(40)), None);
    }

    #[test]
    fn test_late_sample_replaces_parked() {
        let mut throttle = SignalThrottle::new(ms(16));
        throttle.offer(ms(0), 1);
        throttle.offer(ms(5), 2);
        assert_eq!(throttle.offer(ms(20), 3), Some(3));
        assert!(!throttle.has_parked());
    }

    #[test]
    fn test_flush_restarts_window() {
        let mut throttle = SignalThrottle::new(ms(16));
        throttle.offer(ms(0), 1);
        throttle.offer(ms(10), 2);
        assert_eq!(throttle.flush(ms(16)), Some(2));
        // Window now counts from the flush
        assert_eq!(throttle.offer(ms(20), 3), None);
        assert_eq!(throttle.flush(ms(32)), Some(3));
    }
}
