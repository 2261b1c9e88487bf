//! Navigation primitive.
//!
//! The client's notion of "where the user is". In-app transitions and hard
//! navigations (a full reload that discards all in-memory state) are both
//! published on a `watch` channel so that routers, guards and tests observe
//! the same current location.

use std::sync::Arc;

use tokio::sync::watch;

/// How a location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// In-app transition that adds a history entry.
    Push,
    /// In-app transition that replaces the current history entry.
    Replace,
    /// Full reload.
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub kind: NavigationKind,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    location: Arc<watch::Sender<Location>>,
}

impl Navigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(Location {
            path: initial_path.into(),
            kind: NavigationKind::Hard,
        });
        Self {
            location: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Location {
        self.location.borrow().clone()
    }

    pub fn path(&self) -> String {
        self.location.borrow().path.clone()
    }

    pub fn navigate(&self, path: impl Into<String>) {
        self.go(path.into(), NavigationKind::Push);
    }

    pub fn replace(&self, path: impl Into<String>) {
        self.go(path.into(), NavigationKind::Replace);
    }

    /// Full-page navigation: everything held in memory for the old page is
    /// considered discarded.
    pub fn hard_navigate(&self, path: impl Into<String>) {
        self.go(path.into(), NavigationKind::Hard);
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }

    fn go(&self, path: String, kind: NavigationKind) {
        tracing::debug!(?kind, "navigating to {path}");
        self.location.send_replace(Location { path, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_the_last_target_and_kind() {
        let nav = Navigator::new("/");
        assert_eq!(nav.path(), "/");

        nav.navigate("/Medic");
        assert_eq!(
            nav.current(),
            Location {
                path: "/Medic".to_string(),
                kind: NavigationKind::Push
            }
        );

        nav.hard_navigate("/login");
        assert_eq!(nav.current().kind, NavigationKind::Hard);
        assert_eq!(nav.path(), "/login");
    }

    #[tokio::test]
    async fn subscribers_see_changes_from_any_clone() {
        let nav = Navigator::new("/login");
        let mut rx = nav.subscribe();

        let other = nav.clone();
        other.replace("/Secretary");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().path, "/Secretary");
    }
}
