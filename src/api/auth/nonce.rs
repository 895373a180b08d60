//! Server nonce issuance and expiry tracking.

use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Time source for nonce expiry checks, substitutable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed [`Clock`] used outside of tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Tracks outstanding server nonces with a TTL.
///
/// A nonce is valid iff it is present in the map and unexpired. Expired
/// entries are evicted lazily on lookup; [`NonceStore::sweep`] removes them
/// in bulk for callers that run a periodic cleanup task.
pub struct NonceStore {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    nonces: Mutex<HashMap<String, Instant>>,
}

impl NonceStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            nonces: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh nonce and register it until its TTL elapses.
    ///
    /// 16 random bytes, hex encoded. Already-expired entries are dropped
    /// while the lock is held so a burst of challenges cannot pile them up.
    pub async fn generate(&self) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);

        let now = self.clock.now();
        let mut nonces = self.nonces.lock().await;
        nonces.retain(|_, expires_at| now < *expires_at);
        nonces.insert(nonce.clone(), now + self.ttl);

        nonce
    }

    /// Whether the nonce is known and unexpired.
    ///
    /// Unknown values are simply `false`; an expired entry is evicted on
    /// detection.
    pub async fn is_valid(&self, nonce: &str) -> bool {
        let now = self.clock.now();
        let mut nonces = self.nonces.lock().await;
        match nonces.get(nonce) {
            Some(expires_at) if now < *expires_at => true,
            Some(_) => {
                nonces.remove(nonce);
                false
            }
            None => false,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut nonces = self.nonces.lock().await;
        let before = nonces.len();
        nonces.retain(|_, expires_at| now < *expires_at);
        before - nonces.len()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.nonces.lock().await.len()
    }
}
