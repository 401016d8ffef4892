//! Fixed-window rate limiter for outbound acquisition attempts.
//!
//! A hard cap, not a queue: a denied attempt is dropped, never deferred.
//! The window resets lazily on the first check after it has elapsed.

use crate::clock::Clock;
use crate::types::RateWindowStatus;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct WindowState {
    request_count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Bounds acquisition attempts per fixed time window.
pub struct RateLimiter {
    state: Mutex<WindowState>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let window = Duration::from_std(window).unwrap_or_else(|_| Duration::days(1));
        let now = clock.now();
        Self {
            state: Mutex::new(WindowState {
                request_count: 0,
                window_reset_at: window_end(now, window),
            }),
            max_requests,
            window,
            clock,
        }
    }

    /// Take a permit if the current window has one left.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if now > state.window_reset_at {
            state.request_count = 0;
            state.window_reset_at = window_end(now, self.window);
        }

        if state.request_count >= self.max_requests {
            return false;
        }

        state.request_count += 1;
        true
    }

    pub fn status(&self) -> RateWindowStatus {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        RateWindowStatus {
            request_count: state.request_count,
            window_reset_at: state.window_reset_at,
            max_requests: self.max_requests,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// End of a window opened at `now`, clamped to the latest representable instant.
fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(max: u32) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let limiter = RateLimiter::new(max, std::time::Duration::from_secs(60), clock.clone());
        (limiter, clock)
    }

    #[test]
    fn test_allows_up_to_max_then_denies() {
        let (limiter, _) = limiter(10);
        for _ in 0..10 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // Denials are not counted
        assert_eq!(limiter.status().request_count, 10);
    }

    #[test]
    fn test_window_resets_only_after_elapsed() {
        let (limiter, clock) = limiter(2);
        let reset_at = limiter.status().window_reset_at;
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // Exactly at the reset instant the window is still closed
        clock.set(reset_at);
        assert!(!limiter.try_acquire());

        clock.advance(Duration::milliseconds(1));
        assert!(limiter.try_acquire());

        let status = limiter.status();
        assert_eq!(status.request_count, 1);
        assert_eq!(status.window_reset_at, clock.now() + Duration::seconds(60));
        assert_eq!(status.max_requests, 2);
    }

    #[test]
    fn test_idle_window_does_not_carry_over() {
        let (limiter, clock) = limiter(3);
        assert!(limiter.try_acquire());
        clock.advance(Duration::minutes(5));

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_window_past_calendar_range_is_clamped() {
        let clock = Arc::new(ManualClock::default());
        let window = std::time::Duration::from_millis(9_000_000_000_000_000);
        let limiter = RateLimiter::new(1, window, clock);
        assert_eq!(limiter.status().window_reset_at, DateTime::<Utc>::MAX_UTC);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
