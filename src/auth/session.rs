use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::error::AuthError;
use super::store::{MemoryTokenStore, TokenStore};

/// Sessions unused for this many seconds are dropped from the registry.
pub const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 24 * 60 * 60;
/// Upper bound on sessions held by one registry.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One user session: its token store plus the gate that serializes refreshes.
///
/// The manager borrows a `Session` for the duration of one call; it never
/// keeps sessions of its own.
pub struct Session {
    id: SessionId,
    tokens: Arc<dyn TokenStore>,
    refresh_gate: tokio::sync::Mutex<()>,
    login_state: Mutex<Option<String>>,
    created_at: DateTime<Utc>,
    last_seen: Mutex<DateTime<Utc>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("last_seen", &self.last_seen())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_id(SessionId::generate(), tokens)
    }

    pub fn with_id(id: SessionId, tokens: Arc<dyn TokenStore>) -> Self {
        let now = Utc::now();
        Self {
            id,
            tokens,
            refresh_gate: tokio::sync::Mutex::new(()),
            login_state: Mutex::new(None),
            created_at: now,
            last_seen: Mutex::new(now),
        }
    }

    /// Session backed by a fresh [`MemoryTokenStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        match self.last_seen.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn touch(&self, now: DateTime<Utc>) {
        match self.last_seen.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_seen() > timeout
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.tokens.load(), Ok(Some(_)))
    }

    pub(crate) fn refresh_gate(&self) -> &tokio::sync::Mutex<()> {
        &self.refresh_gate
    }

    /// Remember the CSRF `state` sent with the authorization redirect.
    pub fn begin_login(&self, state: impl Into<String>) -> Result<(), AuthError> {
        let mut guard = self
            .login_state
            .lock()
            .map_err(|_| AuthError::Store("login state lock poisoned".to_string()))?;
        *guard = Some(state.into());
        Ok(())
    }

    /// Consume the pending login state, returning whether `returned` matches it.
    pub fn finish_login(&self, returned: Option<&str>) -> bool {
        let pending = match self.login_state.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                tracing::warn!(session_id = %self.id, "Login state lock poisoned");
                return false;
            }
        };
        match (pending, returned) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// Sessions known to the running server, keyed by cookie id.
///
/// Sessions idle for longer than the idle timeout are evicted on access.
/// When the registry is full, creating a session evicts the least recently
/// seen unauthenticated session, or the least recently seen one if every
/// session is authenticated.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::seconds(DEFAULT_IDLE_TIMEOUT_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Cap the number of live sessions. A cap of zero is treated as one.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Look up a live session and mark it as seen. Idle sessions are evicted.
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        let session = match self.sessions.read() {
            Ok(sessions) => sessions.get(&id).cloned()?,
            Err(_) => {
                tracing::warn!(session_id = %id, "Session registry lock poisoned");
                return None;
            }
        };
        let now = Utc::now();
        if session.is_idle(now, self.idle_timeout) {
            self.remove(id);
            tracing::debug!(session_id = %id, "Idle session evicted");
            return None;
        }
        session.touch(now);
        Some(session)
    }

    /// Create and register a session backed by an in-memory store.
    pub fn create(&self) -> Result<Arc<Session>, AuthError> {
        let session = Arc::new(Session::in_memory());
        let mut sessions = self.write()?;

        let now = Utc::now();
        sessions.retain(|_, s| !s.is_idle(now, self.idle_timeout));
        while sessions.len() >= self.max_sessions {
            let Some(victim) = eviction_candidate(&sessions) else {
                break;
            };
            if let Some(evicted) = sessions.remove(&victim) {
                tracing::debug!(
                    session_id = %victim,
                    age_secs = (now - evicted.created_at()).num_seconds(),
                    "Session evicted to stay under the session cap"
                );
            }
        }

        sessions.insert(session.id(), session.clone());
        tracing::debug!(session_id = %session.id(), "Session created");
        Ok(session)
    }

    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.write().ok()?.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<SessionId, Arc<Session>>>, AuthError> {
        self.sessions
            .write()
            .map_err(|_| AuthError::Store("session registry lock poisoned".to_string()))
    }
}

fn eviction_candidate(sessions: &HashMap<SessionId, Arc<Session>>) -> Option<SessionId> {
    let oldest = |authenticated: bool| {
        sessions
            .values()
            .filter(|s| s.is_authenticated() == authenticated)
            .min_by_key(|s| s.last_seen())
            .map(|s| s.id())
    };
    oldest(false).or_else(|| oldest(true))
}
