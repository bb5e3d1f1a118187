//! Fixed-window request limiter keyed by client identity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::clock::{Clock, SystemClock};

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Token count for one key in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBucket {
    pub remaining: u32,
    pub reset_at: Instant,
}

/// In-memory, process-local rate limiter.
///
/// Each key gets `max` requests per `window`. A bucket is created on the first
/// request for a key and replaced wholesale once its window has passed.
/// Buckets are never evicted.
///
/// The `DashMap` entry guard holds the shard lock for the whole
/// check-and-decrement, so concurrent `consume` calls for one key are
/// serialised and at most `max` succeed per window.
pub struct RateLimiter {
    buckets: DashMap<String, RateBucket>,
    max: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Limiter driven by the system clock.
    pub fn new(max: u32, window: Duration) -> Self {
        Self::with_clock(max, window, Arc::new(SystemClock))
    }

    /// Limiter driven by an injected clock.
    pub fn with_clock(max: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            max,
            window,
            clock,
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn fresh_bucket(&self, now: Instant) -> RateBucket {
        RateBucket {
            remaining: self.max.saturating_sub(1),
            reset_at: now + self.window,
        }
    }

    /// Take one token for `key`. Returns `false` when the key is throttled.
    pub fn consume(&self, key: &str) -> bool {
        let now = self.clock.now();

        match self.buckets.entry(key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(self.fresh_bucket(now));
                true
            }
            Entry::Occupied(mut entry) => {
                let bucket = entry.get_mut();
                if bucket.reset_at <= now {
                    *bucket = self.fresh_bucket(now);
                    return true;
                }
                if bucket.remaining == 0 {
                    return false;
                }
                bucket.remaining -= 1;
                true
            }
        }
    }

    /// Tokens left for `key` in its current window.
    ///
    /// Unseen keys and keys whose window has passed report the full `max`.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = self.clock.now();
        self.buckets
            .get(key)
            .filter(|bucket| bucket.reset_at > now)
            .map(|bucket| bucket.remaining)
            .unwrap_or(self.max)
    }

    /// Number of keys with a bucket (monitoring only).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max", &self.max)
            .field("window", &self.window)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}
