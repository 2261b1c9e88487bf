//! Application wiring.
//!
//! [`App`] owns every shared piece of client state and hands out clones of
//! the handles. One `App` per process (or per test).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::config::{ClientConfig, StorageBackend};
use crate::controller::{AuthState, SessionController};
use crate::guard::{Guarded, RouteGuard};
use crate::http::{HttpClientSet, HttpError};
use crate::invalidation::{SessionEvent, SessionInvalidator};
use crate::navigation::Navigator;
use crate::routes::{LOGIN_PATH, ROOT_PATH, Resolution, RouteSpec, resolve};
use crate::session_store::SessionStore;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("http client setup failed: {0}")]
    Http(#[from] HttpError),
}

/// What opening a path leads to.
#[derive(Debug)]
pub enum Page {
    /// The login view.
    Login,
    /// Login was skipped: a session record forwarded to this landing path.
    Forwarded(&'static str),
    View(Guarded<RouteSpec>),
    NotFound,
}

#[derive(Debug)]
pub struct App {
    config: ClientConfig,
    store: SessionStore,
    navigator: Navigator,
    invalidator: SessionInvalidator,
    clients: HttpClientSet,
    controller: SessionController,
    booted: AtomicBool,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl App {
    /// Build the app with the storage backend named in `config`.
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn KeyValueStorage> = match &config.storage {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File { dir } => Arc::new(FileStorage::open(dir)?),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Result<Self, AppError> {
        let store = SessionStore::new(storage);
        let navigator = Navigator::new(ROOT_PATH);
        let invalidator = SessionInvalidator::new(store.clone(), navigator.clone());
        let clients = HttpClientSet::new(&config, invalidator.clone())?;
        let controller = SessionController::new(
            clients.identity().clone(),
            store.clone(),
            navigator.clone(),
            invalidator.clone(),
        );

        Ok(Self {
            config,
            store,
            navigator,
            invalidator,
            clients,
            controller,
            booted: AtomicBool::new(false),
            watcher: Mutex::new(None),
        })
    }

    /// Start the session: forward `/` to login, start the watcher, verify
    /// once, then apply the redirect-from-login rule.
    ///
    /// Only the first call verifies; later calls return the current state.
    pub async fn boot(&self) -> AuthState {
        if self.booted.swap(true, Ordering::SeqCst) {
            return self.controller.state();
        }

        if matches!(resolve(&self.navigator.path()), Resolution::RedirectToLogin) {
            self.navigator.replace(LOGIN_PATH);
        }

        *self.watcher.lock().await = Some(self.controller.spawn_watcher());

        let state = self.controller.verify().await;
        self.controller.handle_location(&self.navigator.path());
        tracing::info!(path = %self.navigator.path(), "client booted");
        state
    }

    /// Navigate to `path` and report what the user ends up seeing.
    pub fn open(&self, path: &str) -> Page {
        match resolve(path) {
            Resolution::Login => {
                self.navigator.navigate(path);
                self.enter_login()
            }
            Resolution::RedirectToLogin => {
                self.navigator.replace(LOGIN_PATH);
                self.enter_login()
            }
            Resolution::Guarded(route) => {
                self.navigator.navigate(path);
                Page::View(self.guard().render(|_| route))
            }
            Resolution::NotFound => {
                self.navigator.navigate(path);
                tracing::debug!("no view for {path}");
                Page::NotFound
            }
        }
    }

    fn enter_login(&self) -> Page {
        match self.controller.handle_location(LOGIN_PATH) {
            Some(target) => Page::Forwarded(target),
            // The watcher may have forwarded first.
            None => match resolve(&self.navigator.path()) {
                Resolution::Guarded(route) if self.store.load().is_some() => {
                    Page::Forwarded(route.area.landing_path())
                }
                _ => Page::Login,
            },
        }
    }

    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.controller.clone())
    }

    /// Tear the controller down and wait for the watcher to stop.
    pub async fn shutdown(&self) {
        self.controller.teardown();
        let watcher = self.watcher.lock().await.take();
        if let Some(handle) = watcher {
            if let Err(err) = handle.await {
                tracing::warn!("session watcher ended abnormally: {err}");
            }
        }
        tracing::info!("client shut down");
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn clients(&self) -> &HttpClientSet {
        &self.clients
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.invalidator.subscribe()
    }
}
