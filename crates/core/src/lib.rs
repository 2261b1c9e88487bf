//! `tecnoquality-core`: shared primitives for the client session core.
//!
//! This crate contains **pure** building blocks (no IO, no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
