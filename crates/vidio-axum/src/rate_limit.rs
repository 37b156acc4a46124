//! Fixed-window per-client rate limiter.
//!
//! Each client identity gets a window `{count, start}`. Within a window the
//! first `max_requests` calls are allowed and the rest refused; the first
//! call after the window has elapsed starts a new window. Windows live in a
//! sharded map so clients only contend on their own shard, and expired
//! windows are evicted by [`FixedWindowRateLimiter::sweep`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;
use vidio_core::RateLimiterPort;

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    start: Instant,
}

/// Process-wide request counter keyed by client identity.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    windows: DashMap<String, RateWindow>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Count a request from `client_id` at `now`; `false` means refuse.
    pub fn check_at(&self, client_id: &str, now: Instant) -> bool {
        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert(RateWindow {
                count: 0,
                start: now,
            });

        if now.saturating_duration_since(entry.start) < self.window {
            if entry.count >= self.max_requests {
                return false;
            }
            entry.count += 1;
        } else {
            *entry = RateWindow {
                count: 1,
                start: now,
            };
        }
        true
    }

    /// Drop every window that has fully elapsed at `now`.
    ///
    /// Returns the number of evicted entries.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.start) < self.window);
        before.saturating_sub(self.windows.len())
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Run [`sweep`](Self::sweep) once per window length until aborted.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.window);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.sweep();
                if evicted > 0 {
                    debug!(
                        evicted,
                        tracked = self.tracked_clients(),
                        "Evicted expired rate-limit windows"
                    );
                }
            }
        })
    }
}

impl RateLimiterPort for FixedWindowRateLimiter {
    fn check(&self, client_id: &str) -> bool {
        self.check_at(client_id, Instant::now())
    }
}
