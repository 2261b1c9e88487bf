//! Forced logout, shared by every HTTP client.
//!
//! When any backend rejects the session, the record is cleared, a
//! [`SessionEvent::Invalidated`] is broadcast to whoever listens (the
//! controller, views), and the client hard-navigates to the login entry point.

use tokio::sync::broadcast;

use crate::http::Service;
use crate::navigation::Navigator;
use crate::routes::LOGIN_PATH;
use crate::session_store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// `service` answered 401; the local session is gone.
    Invalidated { service: Service },
}

#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    store: SessionStore,
    navigator: Navigator,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionInvalidator {
    pub fn new(store: SessionStore, navigator: Navigator) -> Self {
        let (events, _rx) = broadcast::channel(16);
        Self {
            store,
            navigator,
            events,
        }
    }

    pub fn invalidate(&self, service: Service) {
        tracing::warn!(%service, "session rejected by backend; forcing logout");
        self.store.clear();
        // No subscribers is fine: nobody left to tell.
        let _ = self.events.send(SessionEvent::Invalidated { service });
        self.navigator.hard_navigate(LOGIN_PATH);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
