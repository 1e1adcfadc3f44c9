use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Allowed,
    /// Seconds until the key may be used again, rounded up.
    Wait(u64),
}

/// Allows one use per key per window. Only force-refresh requests go through it.
pub struct RateLimiter {
    window: Duration,
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys still inside their window as of the last allowed call.
    pub fn len(&self) -> usize {
        self.last_seen.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records the use when allowed; a refused call does not restart the window.
    pub fn check_and_update(&self, key: &str) -> Throttle {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Throttle {
        // A panic while holding the map cannot leave it inconsistent.
        let mut last_seen = self.last_seen.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(prev) = last_seen.get(key) {
            let elapsed = now.saturating_duration_since(*prev);
            if elapsed < self.window {
                let remaining = self.window - elapsed;
                let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                return Throttle::Wait(secs.max(1));
            }
        }

        // Expired keys would otherwise accumulate forever.
        last_seen.retain(|_, seen| now.saturating_duration_since(*seen) < self.window);
        last_seen.insert(key.to_string(), now);
        Throttle::Allowed
    }
}
