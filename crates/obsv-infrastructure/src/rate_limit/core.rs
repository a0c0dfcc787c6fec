//! Fixed-window counter core
//!
//! Each key maps to `{count, reset_at}`. A request against an absent or
//! lapsed entry replaces it with a fresh window; a blocked request never
//! increments the counter. The store is bounded: on overflow the oldest
//! slice of entries (by reset time) is evicted before the new key is
//! inserted.

use crate::task::SweeperHandle;
use crate::time::now_unix_millis;
use obsv_domain::constants::{
    RATE_LIMIT_EVICTION_PERCENT, RATE_LIMIT_MAX_STORE_SIZE, RATE_LIMIT_SWEEP_INTERVAL_SECS,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window duration
    pub window: Duration,
    /// Maximum requests per key per window
    pub max_requests: u32,
    /// Refund the counted request when the handler reported success
    pub skip_successful: bool,
    /// Refund the counted request when the handler reported failure
    pub skip_failed: bool,
}

impl RateLimitConfig {
    /// Plain window/quota configuration with no outcome-based refunds
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            skip_successful: false,
            skip_failed: false,
        }
    }
}

/// Per-key window state
#[derive(Debug, Clone)]
struct Entry {
    count: u32,
    reset_at_ms: u64,
}

/// Quota snapshot attached to allowed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    /// Configured window maximum
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window resets (epoch milliseconds)
    pub reset_at_ms: u64,
}

/// Fixed-window rate limiter over a bounded key map
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: RwLock<HashMap<String, Entry>>,
    max_store_size: usize,
}

impl RateLimiter {
    /// Create a limiter with the default store bound
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_capacity(config, RATE_LIMIT_MAX_STORE_SIZE)
    }

    /// Create a limiter with an explicit store bound (test seam)
    pub fn with_capacity(config: RateLimitConfig, max_store_size: usize) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            max_store_size,
        }
    }

    /// The limiter's configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request against `key`
    ///
    /// Returns the remaining quota, or the duration until the window resets
    /// when the key is over its limit.
    pub fn check(&self, key: &str) -> Result<Quota, Duration> {
        self.check_at(key, now_unix_millis())
    }

    /// `check` against an explicit clock (test seam)
    pub fn check_at(&self, key: &str, now_ms: u64) -> Result<Quota, Duration> {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Rate limiter lock poisoned, allowing request");
            return Ok(Quota {
                limit: self.config.max_requests,
                remaining: self.config.max_requests,
                reset_at_ms: now_ms + self.config.window.as_millis() as u64,
            });
        };

        let window_ms = self.config.window.as_millis() as u64;
        let needs_fresh = match entries.get(key) {
            Some(entry) => now_ms >= entry.reset_at_ms,
            None => true,
        };

        if needs_fresh && !entries.contains_key(key) && entries.len() >= self.max_store_size {
            Self::evict_oldest(&mut entries);
        }

        let fresh = Entry {
            count: 0,
            reset_at_ms: now_ms + window_ms,
        };
        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| {
                if needs_fresh {
                    *e = fresh.clone();
                }
            })
            .or_insert(fresh);

        if entry.count >= self.config.max_requests {
            let retry_after = Duration::from_millis(entry.reset_at_ms.saturating_sub(now_ms));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(Quota {
            limit: self.config.max_requests,
            remaining: self.config.max_requests - entry.count,
            reset_at_ms: entry.reset_at_ms,
        })
    }

    /// Apply post-hoc outcome bookkeeping for the skip flags
    ///
    /// Called after the wrapped handler returns (or throws). The increment
    /// is reverted only while the same window is still live.
    pub fn record_outcome(&self, key: &str, success: bool) {
        self.record_outcome_at(key, success, now_unix_millis());
    }

    /// `record_outcome` against an explicit clock (test seam)
    pub fn record_outcome_at(&self, key: &str, success: bool, now_ms: u64) {
        let refund = if success {
            self.config.skip_successful
        } else {
            self.config.skip_failed
        };
        if !refund {
            return;
        }

        let Ok(mut entries) = self.entries.write() else {
            warn!("Rate limiter lock poisoned, cannot record outcome");
            return;
        };
        if let Some(entry) = entries.get_mut(key) {
            if now_ms < entry.reset_at_ms {
                entry.count = entry.count.saturating_sub(1);
            }
        }
    }

    /// Delete entries whose window has lapsed, independent of traffic
    pub fn sweep(&self) {
        self.sweep_at(now_unix_millis());
    }

    /// `sweep` against an explicit clock (test seam)
    pub fn sweep_at(&self, now_ms: u64) {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Rate limiter lock poisoned, cannot sweep");
            return;
        };
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at_ms > now_ms);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "swept lapsed rate limit entries");
        }
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the periodic sweep task (every 60 seconds by default)
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        self.spawn_sweeper_every(Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECS))
    }

    /// Spawn the sweep task with a custom interval
    pub fn spawn_sweeper_every(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let limiter = Arc::clone(self);
        SweeperHandle::spawn(interval, move || limiter.sweep())
    }

    /// Evict the oldest slice of entries by reset time
    fn evict_oldest(entries: &mut HashMap<String, Entry>) {
        let evict_count = (entries.len() * RATE_LIMIT_EVICTION_PERCENT / 100).max(1);
        let mut by_reset: Vec<(String, u64)> = entries
            .iter()
            .map(|(k, e)| (k.clone(), e.reset_at_ms))
            .collect();
        by_reset.sort_by_key(|(_, reset)| *reset);
        for (key, _) in by_reset.into_iter().take(evict_count) {
            entries.remove(&key);
        }
        debug!(evicted = evict_count, "rate limit store overflow");
    }
}
