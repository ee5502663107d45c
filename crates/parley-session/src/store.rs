//! Token-addressed store of in-flight conversations.
//!
//! # Lock discipline
//!
//! The map lives behind one `RwLock`. `get` takes the read lock; `create`,
//! `update`, `expire` and `sweep_expired` take the write lock for the
//! mutation only. No lock is ever held across model generation: callers read
//! an entry (receiving a private clone), release, generate, then `update`.
//!
//! # Expiry
//!
//! Every entry gets one deadline, `created + idle_timeout`, set in `create`
//! and never moved by `update`. Past its deadline an entry reads as absent;
//! the sweeper task removes it for real. If an entry expires while a request
//! holds its clone, that request's `update` is dropped and the token's next
//! request starts a fresh conversation.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::window::ConversationWindow;

/// Idle period after which a session is dropped, measured from creation.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Opaque session identifier handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    fn mint() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// State of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEntry {
    pub window: ConversationWindow,
    /// Completed turns so far.
    pub turn_count: u64,
}

#[derive(Debug)]
struct StoredSession {
    entry: SessionEntry,
    expires_at: Instant,
}

/// Shared session map with per-token idle deadlines.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, StoredSession>>,
    clock: Arc<dyn Clock>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Store on the system clock.
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Self::with_clock(idle_timeout, Arc::new(SystemClock))
    }

    pub fn with_clock(idle_timeout: Duration, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            idle_timeout,
        })
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Clone of the live entry for `token`, if any.
    pub async fn get(&self, token: &str) -> Option<SessionEntry> {
        let now = self.clock.now();
        let sessions = self.sessions.read().await;
        let found = sessions
            .get(token)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.entry.clone());
        tracing::debug!(token, hit = found.is_some(), "session lookup");
        found
    }

    /// Mint a token, insert an empty entry and arm its deadline.
    pub async fn create(&self) -> (SessionToken, SessionEntry) {
        let entry = SessionEntry::default();
        let token = self.create_with(entry.clone()).await;
        (token, entry)
    }

    /// Mint a token and insert `entry` under it in one write, arming the
    /// deadline.
    pub async fn create_with(&self, entry: SessionEntry) -> SessionToken {
        let expires_at = self.clock.now() + self.idle_timeout;

        let mut sessions = self.sessions.write().await;
        let mut token = SessionToken::mint();
        while sessions.contains_key(&token) {
            token = SessionToken::mint();
        }
        sessions.insert(token.clone(), StoredSession { entry, expires_at });
        tracing::info!(token = %token, active = sessions.len(), "session created");
        token
    }

    /// Replace the entry for a live token. The deadline is left untouched.
    ///
    /// Returns `false` and stores nothing when the token has expired.
    pub async fn update(&self, token: &str, entry: SessionEntry) -> bool {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(stored) if stored.expires_at > now => {
                stored.entry = entry;
                true
            }
            _ => {
                tracing::debug!(token, "update for expired session dropped");
                false
            }
        }
    }

    /// Remove `token` if present. Returns whether anything was removed.
    pub async fn expire(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .await
            .remove(token)
            .is_some();
        if removed {
            tracing::info!(token, "session expired");
        }
        removed
    }

    /// Remove every entry whose deadline has passed. Returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|token, stored| {
            let keep = stored.expires_at > now;
            if !keep {
                tracing::info!(token = %token, "session expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `period` until `cancel` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("session sweeper stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        let removed = store.sweep_expired().await;
                        if removed > 0 {
                            tracing::debug!(removed, "swept expired sessions");
                        }
                    }
                }
            }
        })
    }

    /// Number of entries still within their deadline.
    pub async fn live_count(&self) -> usize {
        let now = self.clock.now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|stored| stored.expires_at > now)
            .count()
    }

    /// Number of stored entries, including ones past their deadline but not yet swept.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
