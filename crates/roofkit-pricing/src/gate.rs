//! Per-host request spacing.
//!
//! A timestamp gate rather than a rate limiter: each host remembers when its
//! next request may start, and a caller arriving early sleeps for the rest.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RequestGate {
    spacing: Duration,
    next_allowed: Mutex<HashMap<String, Instant>>,
}

impl RequestGate {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_allowed: Mutex::new(HashMap::new()),
        }
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Reserves the next slot for `host` and returns how long to wait for it.
    pub fn reserve(&self, host: &str) -> Duration {
        let now = Instant::now();
        let mut slots = self.next_allowed.lock();
        let start = match slots.get(host) {
            Some(next) if *next > now => *next,
            _ => now,
        };
        slots.insert(host.to_string(), start + self.spacing);
        start - now
    }

    /// Waits until a request to `host` may start.
    pub async fn wait_turn(&self, host: &str) {
        let wait = self.reserve(host);
        if !wait.is_zero() {
            tracing::debug!("Waiting {:?} before requesting {}", wait, host);
            tokio::time::sleep(wait).await;
        }
    }
}
