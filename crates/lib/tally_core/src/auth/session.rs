//! Server-side sessions for the federated browser flow.
//!
//! The client only ever holds an opaque session id (in a cookie); the store
//! keeps the user id and access token behind it. Ids are stored as SHA-256
//! digests so a dump of the map cannot be replayed as cookies.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};

/// Length of generated session ids.
const SESSION_ID_LEN: usize = 48;

/// How often the background task evicts expired sessions.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Data held for a session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub created_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    max_age: Duration,
}

fn generate_session_id() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

fn hash_session_id(id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl SessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Open a session and return its id (the cookie value).
    pub fn create(&self, user_id: &str, access_token: &str) -> String {
        let id = generate_session_id();
        self.sessions.insert(
            hash_session_id(&id),
            Session {
                user_id: user_id.to_string(),
                access_token: access_token.to_string(),
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Look up a live session. Returns `None` if unknown or past max-age.
    pub fn get(&self, id: &str) -> Option<Session> {
        let key = hash_session_id(id);
        let session = self.sessions.get(&key)?.clone();
        if session.created_at.elapsed() >= self.max_age {
            self.sessions.remove(&key);
            return None;
        }
        Some(session)
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(&hash_session_id(id));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let max_age = self.max_age;
        self.sessions
            .retain(|_, s| s.created_at.elapsed() < max_age);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}
