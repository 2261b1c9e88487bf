//! Session controller: the authentication state machine.
//!
//! ```text
//!              verify() ok
//!   Loading ───────────────▶ Authenticated ──┐
//!      │  verify() failed                   │ logout() / 401
//!      └───────────────────▶ Unauthenticated ◀┘
//! ```
//!
//! Only an explicit `verify()` moves back to `Loading`. There is no periodic
//! re-verification.
//!
//! ## Redirect away from login
//!
//! Visiting [`LOGIN_PATH`] with a persisted record forwards to the record's
//! landing path, reading storage only. The rule is not evaluated while the
//! state is `Loading`: a failing `verify()` clears the record first, so a
//! stale record can never trigger a redirect that has to be unwound.
//!
//! ## Teardown
//!
//! After [`SessionController::teardown`], in-flight operations stop waiting
//! and apply no state or navigation changes.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use tecnoquality_auth::{LoginRequest, LoginResponse, Session, VerifyResponse};
use tecnoquality_core::DomainError;

use crate::http::{HttpError, Service, ServiceClient};
use crate::invalidation::{SessionEvent, SessionInvalidator};
use crate::navigation::Navigator;
use crate::routes::{LOGIN_PATH, is_login_path};
use crate::session_store::SessionStore;

pub const VERIFY_ENDPOINT: &str = "/Usuario/verify-token";
pub const LOGIN_ENDPOINT: &str = "/Usuario/login";
pub const LOGOUT_ENDPOINT: &str = "/Usuario/logout";

/// Shown for every failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Credenciales inválidas";

/// Authentication state (not persisted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    /// `user` is `None` when the backend confirmed the session without an
    /// identity and nothing is persisted either.
    Authenticated { user: Option<Session> },
    Unauthenticated,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated { user } => user.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login rejected: {0}")]
    Rejected(#[source] HttpError),

    #[error("login response unusable: {0}")]
    Payload(#[source] HttpError),

    #[error(transparent)]
    Role(#[from] DomainError),

    #[error("login abandoned: controller torn down")]
    Cancelled,
}

impl LoginError {
    /// The user-facing message. Deliberately the same for every cause.
    pub fn user_message(&self) -> &'static str {
        LOGIN_FAILED_MESSAGE
    }
}

#[derive(Debug)]
struct Inner {
    identity: ServiceClient,
    store: SessionStore,
    navigator: Navigator,
    invalidator: SessionInvalidator,
    state: watch::Sender<AuthState>,
    teardown: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Build a controller in the `Loading` state. `identity` must be the
    /// identity-service client.
    pub fn new(
        identity: ServiceClient,
        store: SessionStore,
        navigator: Navigator,
        invalidator: SessionInvalidator,
    ) -> Self {
        debug_assert_eq!(identity.service(), Service::Identity);
        let (state, _) = watch::channel(AuthState::Loading);
        let (teardown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                identity,
                store,
                navigator,
                invalidator,
                state,
                teardown,
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<Session> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    pub fn is_torn_down(&self) -> bool {
        *self.inner.teardown.borrow()
    }

    /// Stop applying results of in-flight operations and stop the watcher.
    pub fn teardown(&self) {
        self.inner.teardown.send_replace(true);
    }

    /// Ask the identity service whether the current session is valid.
    ///
    /// Any failure counts as "not logged in": the record is cleared and the
    /// state becomes `Unauthenticated`.
    pub async fn verify(&self) -> AuthState {
        if self.is_torn_down() {
            return self.state();
        }
        self.set_state(AuthState::Loading);

        let response = tokio::select! {
            biased;
            _ = self.torn_down() => {
                tracing::debug!("verify abandoned: controller torn down");
                return self.state();
            }
            response = self.inner.identity.post_empty(VERIFY_ENDPOINT) => response,
        };

        let verified = response
            .map_err(|err| err.to_string())
            .and_then(|response| {
                let payload = if response.is_empty() {
                    VerifyResponse::default()
                } else {
                    response.json::<VerifyResponse>().map_err(|err| err.to_string())?
                };
                payload.session().map_err(|err| err.to_string())
            });

        let next = match verified {
            Ok(Some(session)) => {
                self.inner.store.save(&session);
                AuthState::Authenticated {
                    user: Some(session),
                }
            }
            Ok(None) => AuthState::Authenticated {
                user: self.inner.store.load(),
            },
            Err(reason) => {
                tracing::warn!("session verification failed: {reason}");
                self.inner.store.clear();
                AuthState::Unauthenticated
            }
        };

        tracing::info!(authenticated = next.is_authenticated(), "session verified");
        self.set_state(next.clone());
        next
    }

    /// Log in. `true` on success; on failure nothing changes and the caller
    /// shows [`LOGIN_FAILED_MESSAGE`].
    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.try_login(email, password).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("login failed: {err}");
                false
            }
        }
    }

    /// Log in, reporting why it failed. Does not retry.
    pub async fn try_login(&self, email: &str, password: &str) -> Result<Session, LoginError> {
        let request = LoginRequest { email, password };

        let response = tokio::select! {
            biased;
            _ = self.torn_down() => return Err(LoginError::Cancelled),
            response = self.inner.identity.post(LOGIN_ENDPOINT, &request) => {
                response.map_err(LoginError::Rejected)?
            }
        };

        let payload: LoginResponse = response.json().map_err(LoginError::Payload)?;
        let session = payload.into_session()?;

        if self.is_torn_down() {
            return Err(LoginError::Cancelled);
        }

        self.inner.store.save(&session);
        self.set_state(AuthState::Authenticated {
            user: Some(session.clone()),
        });
        tracing::info!(role = %session.role, "logged in");
        self.inner.navigator.navigate(session.landing_path());
        Ok(session)
    }

    /// Log out. The server call is best-effort; locally this always ends
    /// logged out.
    pub async fn logout(&self) {
        tokio::select! {
            biased;
            _ = self.torn_down() => {}
            response = self.inner.identity.post_empty(LOGOUT_ENDPOINT) => {
                if let Err(err) = response {
                    tracing::warn!("logout request failed, clearing local session anyway: {err}");
                }
            }
        }

        // The user asked to leave: the record goes even after teardown.
        self.inner.store.clear();

        if self.is_torn_down() {
            return;
        }
        self.set_state(AuthState::Unauthenticated);
        tracing::info!("logged out");
        self.inner.navigator.navigate(LOGIN_PATH);
    }

    /// Apply the redirect-away-from-login rule for `path`.
    ///
    /// Returns the landing path navigated to, if any. Acts only while the
    /// navigator is still on login, so repeated calls navigate once. No
    /// network access.
    pub fn handle_location(&self, path: &str) -> Option<&'static str> {
        if !is_login_path(path) || self.is_torn_down() {
            return None;
        }
        if !is_login_path(&self.inner.navigator.path()) {
            return None;
        }
        if self.inner.state.borrow().is_loading() {
            tracing::debug!("login visited while verifying; redirect deferred");
            return None;
        }

        let session = self.inner.store.load()?;
        let target = session.landing_path();
        tracing::debug!(role = %session.role, "already signed in; leaving login");
        self.inner.navigator.navigate(target);
        Some(target)
    }

    /// Spawn the background watcher: location changes feed
    /// [`SessionController::handle_location`], invalidation signals move the
    /// state to `Unauthenticated`. Stops on teardown.
    pub fn spawn_watcher(&self) -> JoinHandle<()> {
        let controller = self.clone();
        let mut locations = self.inner.navigator.subscribe();
        let mut events = self.inner.invalidator.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = controller.torn_down() => break,
                    changed = locations.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let path = locations.borrow_and_update().path.clone();
                        controller.handle_location(&path);
                    }
                    event = events.recv() => match event {
                        Ok(SessionEvent::Invalidated { service }) => {
                            controller.on_invalidated(service);
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!("missed {missed} session events");
                            controller.on_invalidated(Service::Identity);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("session watcher stopped");
        })
    }

    fn on_invalidated(&self, service: Service) {
        if self.is_torn_down() {
            return;
        }
        tracing::info!(%service, "session invalidated by backend");
        self.set_state(AuthState::Unauthenticated);
    }

    fn set_state(&self, state: AuthState) {
        self.inner.state.send_replace(state);
    }

    /// Resolves once the controller is torn down.
    async fn torn_down(&self) {
        let mut rx = self.inner.teardown.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, state: AuthState) {
        self.set_state(state);
    }
}
