//! In-process session store backed by `DashMap`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use oidc_rp_core::{SessionState, SessionStore, SharedSession};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Sessions live for the lifetime of the process.
///
/// Map shards are only locked long enough to clone the session handle; the
/// per-session mutex is acquired by the caller afterwards.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Entry>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, session_id: &str) -> SharedSession {
        let mut entry = self.sessions.entry(session_id.to_string()).or_insert_with(|| Entry {
            session: Arc::new(Mutex::new(SessionState::new())),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        Arc::clone(&entry.session)
    }

    async fn get(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions.get_mut(session_id).map(|mut entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.session)
        })
    }

    async fn insert(&self, session_id: &str, state: SessionState) -> SharedSession {
        let session = Arc::new(Mutex::new(state));
        self.sessions.insert(
            session_id.to_string(),
            Entry { session: Arc::clone(&session), last_seen: Instant::now() },
        );
        session
    }

    async fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    async fn purge_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!(purged, remaining = self.sessions.len(), "Purged idle sessions");
        }
        purged
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore").field("sessions", &self.sessions.len()).finish()
    }
}
