//! `tecnoquality-auth`: pure role-authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows the
//! role table, the shape of the persisted session record, and the identity
//! service payloads, nothing else.

pub mod identity;
pub mod roles;
pub mod session;

pub use identity::{LoginRequest, LoginResponse, VerifyResponse};
pub use roles::{Role, landing_path, role_label};
pub use session::Session;
