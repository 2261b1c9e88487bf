//! Route guard and navigation shell.
//!
//! A guarded view is only ever built for an authenticated session; the guard
//! decides between a placeholder, a redirect to login, or the view wrapped in
//! the [`NavShell`].

use tecnoquality_auth::Role;
use tecnoquality_core::UserId;

use crate::controller::{AuthState, SessionController};
use crate::routes::LOGIN_PATH;

/// Neutral placeholder shown while the session is being verified.
pub const LOADING_PLACEHOLDER: &str = "Cargando...";

/// Shell display name when the record carries none.
pub const FALLBACK_DISPLAY_NAME: &str = "Usuario";

/// Outcome of guarding a view.
#[derive(Debug)]
pub enum Guarded<V> {
    /// Verification in flight; show [`LOADING_PLACEHOLDER`].
    Loading,
    /// Not signed in; a replace-navigation to this path was issued.
    Redirect(&'static str),
    Render { shell: NavShell, view: V },
}

impl<V> Guarded<V> {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Guarded::Render { .. })
    }

    pub fn view(&self) -> Option<&V> {
        match self {
            Guarded::Render { view, .. } => Some(view),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    controller: SessionController,
}

impl RouteGuard {
    pub fn new(controller: SessionController) -> Self {
        Self { controller }
    }

    /// Guard `child`. It is called only when the session is authenticated.
    pub fn render<V>(&self, child: impl FnOnce(&NavShell) -> V) -> Guarded<V> {
        match self.controller.state() {
            AuthState::Loading => Guarded::Loading,
            AuthState::Unauthenticated => {
                self.controller.navigator().replace(LOGIN_PATH);
                Guarded::Redirect(LOGIN_PATH)
            }
            AuthState::Authenticated { .. } => {
                let shell = NavShell {
                    controller: self.controller.clone(),
                };
                let view = child(&shell);
                Guarded::Render { shell, view }
            }
        }
    }
}

/// The navigation shell around every guarded view.
///
/// Display data comes from the persisted record, not from controller state.
#[derive(Debug, Clone)]
pub struct NavShell {
    controller: SessionController,
}

impl NavShell {
    pub fn display_name(&self) -> String {
        self.controller
            .store()
            .display_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
    }

    pub fn role(&self) -> Option<Role> {
        self.controller.store().role()
    }

    pub fn role_label(&self) -> Option<&'static str> {
        self.role().map(Role::label)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.controller.store().user_id()
    }

    pub async fn logout(&self) {
        self.controller.logout().await;
    }

    /// Brand/home action. Goes to login, which forwards a signed-in user to
    /// their landing path.
    pub fn go_home(&self) {
        self.controller.navigator().navigate(LOGIN_PATH);
    }
}
