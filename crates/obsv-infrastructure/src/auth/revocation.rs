//! Token revocation store
//!
//! Process-wide mapping from token id (jti) to the token's natural expiry.
//! Entries die two ways: lazily when `is_revoked` observes an expired entry,
//! and in bulk by the periodic sweep. A token whose expiry is at or before
//! "now" is treated as naturally expired rather than actively revoked, so
//! `is_revoked` reports false for it.

use crate::task::SweeperHandle;
use crate::time::now_unix_secs;
use obsv_domain::constants::REVOCATION_SWEEP_INTERVAL_SECS;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

/// In-memory revocation store, constructor-built and injected (never a
/// module-level singleton) so tests get isolated instances.
#[derive(Debug, Default)]
pub struct TokenRevocationStore {
    entries: RwLock<HashMap<String, u64>>,
}

impl TokenRevocationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token until its natural expiry
    pub fn revoke(&self, token_id: &str, expires_at_secs: u64) {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Revocation store lock poisoned, cannot revoke token");
            return;
        };
        entries.insert(token_id.to_string(), expires_at_secs);
        info!(event = "token revoked", token_id, "audit");
    }

    /// Whether a token id is actively revoked
    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.is_revoked_at(token_id, now_unix_secs())
    }

    /// `is_revoked` against an explicit clock (test seam)
    ///
    /// An entry whose expiry is at or before `now` is deleted on sight and
    /// reported as not revoked: the token is already invalid by expiry.
    pub fn is_revoked_at(&self, token_id: &str, now: u64) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Revocation store lock poisoned, treating token as not revoked");
            return false;
        };
        match entries.get(token_id) {
            None => false,
            Some(&expiry) if now >= expiry => {
                entries.remove(token_id);
                false
            }
            Some(_) => true,
        }
    }

    /// Drop every entry at or past its expiry; logs only when work was done
    pub fn sweep(&self) {
        self.sweep_at(now_unix_secs());
    }

    /// `sweep` against an explicit clock (test seam)
    pub fn sweep_at(&self, now: u64) {
        let Ok(mut entries) = self.entries.write() else {
            warn!("Revocation store lock poisoned, cannot sweep");
            return;
        };
        let before = entries.len();
        entries.retain(|_, &mut expiry| expiry > now);
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, "swept expired revocation entries");
        }
    }

    /// Number of physically retained entries (swept or not)
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the periodic sweep task (every 5 minutes by default)
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        self.spawn_sweeper_every(Duration::from_secs(REVOCATION_SWEEP_INTERVAL_SECS))
    }

    /// Spawn the sweep task with a custom interval
    pub fn spawn_sweeper_every(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let store = Arc::clone(self);
        SweeperHandle::spawn(interval, move || store.sweep())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token_not_revoked() {
        let store = TokenRevocationStore::new();
        assert!(!store.is_revoked("never-seen"));
    }

    #[test]
    fn test_revoke_then_check() {
        let store = TokenRevocationStore::new();
        store.revoke("jti-1", 1_000);
        assert!(store.is_revoked_at("jti-1", 500));
    }

    #[test]
    fn test_expired_entry_reported_not_revoked_and_removed() {
        let store = TokenRevocationStore::new();
        store.revoke("jti-1", 1_000);

        assert!(!store.is_revoked_at("jti-1", 1_500));
        assert!(store.is_empty());
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        // Strict comparison: expiry exactly at "now" means already expired.
        let store = TokenRevocationStore::new();
        store.revoke("jti-1", 1_000);
        assert!(!store.is_revoked_at("jti-1", 1_000));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = TokenRevocationStore::new();
        store.revoke("old", 100);
        store.revoke("live", 10_000);

        store.sweep_at(5_000);
        assert_eq!(store.len(), 1);
        assert!(store.is_revoked_at("live", 5_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_lifecycle() {
        let store = Arc::new(TokenRevocationStore::new());
        let handle = store.spawn_sweeper_every(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.shutdown();
        handle.shutdown(); // double teardown must be a no-op
    }
}
