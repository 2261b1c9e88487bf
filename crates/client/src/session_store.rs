//! Persisted session record.
//!
//! Every operation is fail-safe: storage and parse failures are logged and
//! turned into "no session" (on read) or a no-op (on write), never propagated
//! into the caller.

use std::sync::Arc;

use tecnoquality_auth::{Role, Session};
use tecnoquality_core::UserId;

use crate::storage::{KeyValueStorage, MemoryStorage};

/// Storage key of the session record.
pub const SESSION_KEY: &str = "user_data";

/// Handle to the single persisted session record. Cheap to clone; all clones
/// share the same medium.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist `session`, replacing any previous record.
    pub fn save(&self, session: &Session) {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!("failed to serialize session record: {err}");
                return;
            }
        };

        match self.storage.set(SESSION_KEY, &json) {
            Ok(()) => tracing::debug!(role = %session.role, "session record saved"),
            Err(err) => tracing::error!("failed to save session record: {err}"),
        }
    }

    /// Current record, or `None` if absent, unreadable or malformed.
    pub fn load(&self) -> Option<Session> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::error!("failed to read session record: {err}");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!("ignoring malformed session record: {err}");
                None
            }
        }
    }

    /// Remove the record. Idempotent.
    pub fn clear(&self) {
        if let Err(err) = self.storage.remove(SESSION_KEY) {
            tracing::error!("failed to clear session record: {err}");
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.load().map(|s| s.role)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.load().map(|s| s.user_id)
    }

    pub fn display_name(&self) -> Option<String> {
        self.load().map(|s| s.display_name)
    }
}
