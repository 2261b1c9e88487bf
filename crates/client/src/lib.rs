//! `tecnoquality-client`
//!
//! **Responsibility:** Session and role-authorization core of the
//! TecnoQuality client.
//!
//! This crate provides:
//! - The persisted session record and its storage backends
//! - The session controller (verify / login / logout, redirect from login)
//! - Four backend HTTP clients sharing one response policy (HTML guard, 401
//!   forced logout)
//! - The route table and route guard
//!
//! The backend stays the authority on whether a session is valid; this crate
//! only mirrors it.

pub mod app;
pub mod config;
pub mod controller;
pub mod guard;
pub mod http;
pub mod invalidation;
pub mod navigation;
pub mod routes;
pub mod session_store;
pub mod storage;

pub use app::{App, AppError, Page};
pub use config::{ClientConfig, StorageBackend};
pub use controller::{AuthState, LOGIN_FAILED_MESSAGE, LoginError, SessionController};
pub use guard::{Guarded, LOADING_PLACEHOLDER, NavShell, RouteGuard};
pub use http::{HttpClientSet, HttpError, Service, ServiceClient, ServiceResponse};
pub use invalidation::{SessionEvent, SessionInvalidator};
pub use navigation::{Location, NavigationKind, Navigator};
pub use session_store::SessionStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
