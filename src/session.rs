//! In-memory admin session cache with sliding expiry.
//!
//! Tracks which opaque tokens currently represent a logged-in
//! administrator. Tokens live only in memory and are never persisted;
//! restarting the process logs everyone out.
//!
//! # Concurrency
//!
//! `issue`, `validate`, `remove`, and `sweep` are called from independent
//! request workers and from the background sweeper. One mutex guards the
//! whole collection, so a validate's check-and-refresh can never race a
//! sweep's removal of the same entry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;

/// Random bytes behind each session token (encodes to 43 characters).
const TOKEN_BYTES: usize = 32;

/// One live admin session.
struct SessionEntry {
    token: String,
    username: String,
    admin_tab: bool,
    /// Last time the session was issued or successfully validated.
    touched: Instant,
}

/// Concurrency-safe store of live admin sessions.
pub struct SessionCache {
    entries: Mutex<Vec<SessionEntry>>,
    ttl: Duration,
}

impl SessionCache {
    /// Create an empty cache whose entries expire `ttl` after last use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            ttl,
        }
    }

    /// The sliding expiry window. The session cookie's Max-Age mirrors it.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token for a logged-in administrator.
    ///
    /// The token is drawn from the OS randomness source; collision
    /// probability at 32 bytes is negligible, so no uniqueness check is
    /// made. A randomness failure is reported, never papered over.
    pub fn issue(&self, username: &str, admin_tab: bool) -> Result<String, AppError> {
        let mut buf = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| AppError::Random(e.to_string()))?;
        let token = URL_SAFE_NO_PAD.encode(buf);

        self.lock().push(SessionEntry {
            token: token.clone(),
            username: username.to_owned(),
            admin_tab,
            touched: Instant::now(),
        });

        Ok(token)
    }

    /// Look up a token, refreshing its expiry on success (sliding window).
    ///
    /// Returns the session's username and adminTab flag, or `None` when
    /// the token is unknown or has sat idle past the ttl. Absence is a
    /// normal outcome; the caller redirects to login.
    pub fn validate(&self, token: &str) -> Option<(String, bool)> {
        let mut entries = self.lock();
        let entry = entries
            .iter_mut()
            .find(|e| e.token == token && e.touched.elapsed() < self.ttl)?;

        entry.touched = Instant::now();
        Some((entry.username.clone(), entry.admin_tab))
    }

    /// Drop a token immediately (explicit logout).
    pub fn remove(&self, token: &str) {
        self.lock().retain(|e| e.token != token);
    }

    /// Evict every entry older than the ttl. Returns how many were removed.
    ///
    /// Age is re-read under the lock, so an entry refreshed a moment ago
    /// by `validate` survives the pass.
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.touched.elapsed() < self.ttl);
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SessionEntry>> {
        // A poisoned lock still holds coherent data; keep serving rather
        // than propagating a panic into request workers or the sweeper.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Run the periodic eviction loop until `cancel` fires.
///
/// The select is biased so a pending stop signal wins over a tick that
/// becomes ready at the same moment. A sweep pass itself is short and
/// bounded by the number of live sessions, so it is not interrupted
/// mid-pass.
pub async fn run_sweeper(cache: Arc<SessionCache>, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = cache.sweep();
                if evicted > 0 {
                    tracing::info!(evicted, "evicted expired admin sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn issued_token_validates_immediately() {
        let cache = SessionCache::new(Duration::from_secs(3600));
        let token = cache.issue("alice", true).unwrap();

        assert_eq!(cache.validate(&token), Some(("alice".to_string(), true)));
    }

    #[test]
    fn unknown_token_is_rejected() {
        let cache = SessionCache::new(Duration::from_secs(3600));
        cache.issue("alice", false).unwrap();

        assert_eq!(cache.validate("no-such-token"), None);
    }

    #[test]
    fn tokens_are_distinct_and_nonempty() {
        let cache = SessionCache::new(Duration::from_secs(3600));
        let a = cache.issue("alice", false).unwrap();
        let b = cache.issue("alice", false).unwrap();

        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn idle_token_expires_and_sweep_removes_it() {
        let cache = SessionCache::new(Duration::from_millis(40));
        let token = cache.issue("bob", false).unwrap();

        thread::sleep(Duration::from_millis(100));

        // Expired entries fail validation even before a sweep runs.
        assert_eq!(cache.validate(&token), None);

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn repeated_use_keeps_a_token_alive_past_the_window() {
        let cache = SessionCache::new(Duration::from_millis(200));
        let token = cache.issue("carol", true).unwrap();

        // Five touches 80ms apart: total idle time would have expired the
        // token twice over, but each validate resets the clock.
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(80));
            assert!(cache.validate(&token).is_some());
        }

        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn removed_token_no_longer_validates() {
        let cache = SessionCache::new(Duration::from_secs(3600));
        let token = cache.issue("dave", false).unwrap();

        cache.remove(&token);

        assert_eq!(cache.validate(&token), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn concurrent_issue_validate_and_sweep() {
        let cache = Arc::new(SessionCache::new(Duration::from_secs(3600)));
        let mut handles = Vec::new();

        for i in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let token = cache.issue(&format!("user{i}"), false).unwrap();
                    assert!(cache.validate(&token).is_some());
                    cache.sweep();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Nothing expired, so everything issued is still there.
        assert_eq!(cache.len(), 200);
    }

    #[tokio::test]
    async fn sweeper_evicts_and_stops_on_cancel() {
        let cache = Arc::new(SessionCache::new(Duration::from_millis(20)));
        let token = cache.issue("erin", false).unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_sweeper(
            Arc::clone(&cache),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.validate(&token), None);
        assert_eq!(cache.len(), 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly after cancel")
            .unwrap();
    }
}
