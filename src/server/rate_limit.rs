//! Fixed-window request quota per client address.
//!
//! The resolution cost of a single request is bounded by the similarity
//! scan over the known-term set, so a strict per-client quota (one request
//! per second in the original deployment) keeps load bounded.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Windows are dropped opportunistically once the map grows past this.
const SWEEP_THRESHOLD: usize = 1024;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per client. A window opens on the first request
/// and resets `window` after it started.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client`; `false` when the quota for the
    /// current window is spent.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn client(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, last_octet))
    }

    #[test]
    fn test_quota_is_enforced_within_a_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check(client(1)));
        assert!(limiter.check(client(1)));
        assert!(!limiter.check(client(1)));
    }

    #[test]
    fn test_clients_are_tracked_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(client(1)));
        assert!(!limiter.check(client(1)));
        assert!(limiter.check(client(2)));
    }

    #[test]
    fn test_a_new_window_admits_again() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.check(client(1)));
        assert!(!limiter.check(client(1)));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check(client(1)));
    }
}
