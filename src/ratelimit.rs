//! # Rate Limiter
//! Sliding-window budget shared by every outbound request.
//!
//! EDGAR's access policy allows 10 requests per second. Two constraints
//! enforce that here: at most `max_in_window` grants inside the trailing
//! `window`, and a fixed `floor_delay` between any two grants. The floor
//! alone already caps throughput at 10/s with the default settings; the
//! window check stays as a second line.

use std::collections::VecDeque;

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Trailing window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(10);
/// Grant budget inside one window.
const DEFAULT_WINDOW_CAP: usize = 100;
/// Minimum spacing between two grants.
const DEFAULT_FLOOR_DELAY: Duration = Duration::from_millis(100);

/// Task-safe sliding-window rate limiter over grant timestamps.
///
/// The mutex is held across the in-call waits so exactly one caller at a
/// time passes the prune/wait/append step; concurrent callers from the
/// poller and all workers queue up behind it.
#[derive(Debug)]
pub struct RateLimiter {
    grants: Mutex<VecDeque<Instant>>,
    window: Duration,
    max_in_window: usize,
    floor_delay: Duration,
}

impl RateLimiter {
    pub fn new(window: Duration, max_in_window: usize, floor_delay: Duration) -> Self {
        Self {
            grants: Mutex::new(VecDeque::new()),
            window,
            max_in_window,
            floor_delay,
        }
    }

    /// Limiter tuned to EDGAR's published guidelines.
    pub fn edgar_default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_WINDOW_CAP, DEFAULT_FLOOR_DELAY)
    }

    /// Block until one outbound request is permitted, then record the grant.
    ///
    /// Drops grants older than the window, waits out the window budget if
    /// it is exhausted, then sleeps the floor delay unconditionally so any
    /// two grants are spaced apart regardless of window occupancy.
    pub async fn acquire(&self) {
        let mut grants = self.grants.lock().await;

        let now = Instant::now();
        while let Some(front) = grants.front() {
            if now.duration_since(*front) >= self.window {
                grants.pop_front();
            } else {
                break;
            }
        }

        if grants.len() >= self.max_in_window {
            if let Some(oldest) = grants.front() {
                let wait = self.window.saturating_sub(now.duration_since(*oldest));
                if !wait.is_zero() {
                    tracing::debug!(wait_ms = wait.as_millis() as u64, "rate window exhausted");
                    sleep(wait).await;
                }
            }
        }

        sleep(self.floor_delay).await;
        grants.push_back(Instant::now());
    }

    /// Grants currently inside the window (diagnostics only).
    pub async fn in_window(&self) -> usize {
        let grants = self.grants.lock().await;
        let now = Instant::now();
        grants
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn consecutive_grants_are_floor_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(10), 100, Duration::from_millis(100));

        let mut stamps = Vec::new();
        for _ in 0..5 {
            limiter.acquire().await;
            stamps.push(Instant::now());
        }
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_window_forces_a_wait() {
        // Floor delay of zero isolates the window constraint.
        let limiter = RateLimiter::new(Duration::from_secs(10), 3, Duration::ZERO);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(1));

        // Fourth grant must wait for the oldest one to leave the window.
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(limiter.in_window().await <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn window_never_exceeds_cap() {
        let limiter = RateLimiter::new(Duration::from_secs(2), 5, Duration::from_millis(10));
        for _ in 0..20 {
            limiter.acquire().await;
            assert!(limiter.in_window().await <= 5);
        }
    }
}
