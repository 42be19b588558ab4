//! Burst-limited gate for repetitive error logs.

use std::time::{Duration, Instant};

/// Allows up to `burst` events per `interval`, then suppresses the rest
/// until the interval rolls over.
#[derive(Debug, Clone)]
pub struct RateLimit {
    interval: Duration,
    burst: u32,
    window_start: Option<Instant>,
    printed: u32,
    suppressed: u32,
}

impl Default for RateLimit {
    /// Ten messages every five seconds.
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 10)
    }
}

impl RateLimit {
    /// Create a limiter.
    #[must_use]
    pub const fn new(interval: Duration, burst: u32) -> Self {
        Self {
            interval,
            burst,
            window_start: None,
            printed: 0,
            suppressed: 0,
        }
    }

    /// Whether an event at `now` may be reported.
    ///
    /// When a new window opens, the number of events suppressed in the
    /// previous one is returned through `Some(n)` on the first allowed call.
    pub fn check(&mut self, now: Instant) -> Option<u32> {
        let expired = self
            .window_start
            .map_or(true, |start| now.duration_since(start) >= self.interval);
        if expired {
            self.window_start = Some(now);
            self.printed = 0;
        }

        if self.printed < self.burst {
            self.printed += 1;
            Some(std::mem::take(&mut self.suppressed))
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            None
        }
    }

    /// Shorthand for [`RateLimit::check`] at the current instant.
    pub fn allow(&mut self) -> Option<u32> {
        self.check(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_suppress() {
        let mut limit = RateLimit::new(Duration::from_secs(5), 3);
        let now = Instant::now();

        assert_eq!(limit.check(now), Some(0));
        assert_eq!(limit.check(now), Some(0));
        assert_eq!(limit.check(now), Some(0));
        assert_eq!(limit.check(now), None);
        assert_eq!(limit.check(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_new_window_reports_suppressed() {
        let mut limit = RateLimit::new(Duration::from_secs(5), 1);
        let now = Instant::now();

        assert_eq!(limit.check(now), Some(0));
        assert_eq!(limit.check(now), None);
        assert_eq!(limit.check(now), None);
        assert_eq!(limit.check(now + Duration::from_secs(5)), Some(2));
        assert_eq!(limit.check(now + Duration::from_secs(6)), None);
    }
}
