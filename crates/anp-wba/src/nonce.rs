//! # Nonce Replay Protection
//!
//! Process-local registry of nonces consumed within their validity window.
//! A signed challenge whose nonce was already seen is rejected; entries
//! older than the window are pruned on insertion so the map stays bounded
//! by the arrival rate times the window.
//!
//! The lock is `parking_lot`, not `tokio::sync` — it is never held across
//! an await point.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::error::WbaError;

/// Single-use nonce registry with a bounded validity window.
#[derive(Debug)]
pub struct NonceRegistry {
    window: Duration,
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl NonceRegistry {
    /// Create a registry whose nonces stay consumed for `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record `nonce` as consumed at `now`.
    ///
    /// # Errors
    ///
    /// [`WbaError::ReplayedNonce`] when the nonce was already consumed
    /// within the validity window.
    pub fn check_and_store(&self, nonce: &str, now: DateTime<Utc>) -> Result<(), WbaError> {
        let cutoff = now - self.window;
        let mut seen = self.seen.lock();
        seen.retain(|_, first_seen| *first_seen > cutoff);

        if seen.contains_key(nonce) {
            return Err(WbaError::ReplayedNonce(nonce.to_string()));
        }
        seen.insert(nonce.to_string(), now);
        Ok(())
    }

    /// Number of live (unexpired) nonces currently tracked.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Whether the registry currently tracks no nonces.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NonceRegistry {
        NonceRegistry::new(Duration::minutes(5))
    }

    #[test]
    fn fresh_nonce_accepted() {
        let reg = registry();
        assert!(reg.check_and_store("n1", Utc::now()).is_ok());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn replayed_nonce_rejected() {
        let reg = registry();
        let now = Utc::now();
        reg.check_and_store("n1", now).unwrap();
        let err = reg.check_and_store("n1", now).unwrap_err();
        assert!(matches!(err, WbaError::ReplayedNonce(n) if n == "n1"));
    }

    #[test]
    fn distinct_nonces_accepted() {
        let reg = registry();
        let now = Utc::now();
        reg.check_and_store("n1", now).unwrap();
        reg.check_and_store("n2", now).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn expired_nonce_may_be_reused() {
        let reg = registry();
        let t0 = Utc::now();
        reg.check_and_store("n1", t0).unwrap();
        // Six minutes later the five-minute window has passed.
        let t1 = t0 + Duration::minutes(6);
        assert!(reg.check_and_store("n1", t1).is_ok());
    }

    #[test]
    fn expired_entries_are_pruned() {
        let reg = registry();
        let t0 = Utc::now();
        reg.check_and_store("old", t0).unwrap();
        let t1 = t0 + Duration::minutes(10);
        reg.check_and_store("new", t1).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn replay_at_window_boundary_still_rejected() {
        let reg = registry();
        let t0 = Utc::now();
        reg.check_and_store("n1", t0).unwrap();
        // Strictly inside the window.
        let t1 = t0 + Duration::minutes(4);
        assert!(reg.check_and_store("n1", t1).is_err());
    }
}
