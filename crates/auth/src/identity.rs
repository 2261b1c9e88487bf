//! Identity service payloads (transport-agnostic).
//!
//! These mirror the JSON bodies of the `/Usuario/*` endpoints. Turning them
//! into a [`Session`] is the only place a numeric role code is interpreted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tecnoquality_core::{DomainResult, UserId};

use crate::{Role, Session};

/// Body of `POST /Usuario/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub rol_usuario: i64,
    pub nombre: String,
    pub id_usuario: UserId,
}

impl LoginResponse {
    /// Resolve the role code and build the record to persist.
    pub fn into_session(self) -> DomainResult<Session> {
        let role = Role::from_code(self.rol_usuario)?;
        Ok(Session {
            role,
            display_name: self.nombre,
            user_id: self.id_usuario,
        })
    }
}

/// Payload of `POST /Usuario/verify-token`.
///
/// The identity service may answer with `{ "user": {...} }` or just
/// `{ "success": true }`; both mean the session is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub user: Option<Value>,

    #[serde(default)]
    pub success: Option<bool>,
}

impl VerifyResponse {
    /// The identity carried by the response, if any.
    ///
    /// Accepts the login shape (numeric role code) and the stored shape (role
    /// label). A user object in neither shape carries no usable identity and
    /// yields `Ok(None)`; a login-shaped user with an unknown role code is an
    /// error.
    pub fn session(&self) -> DomainResult<Option<Session>> {
        let Some(user) = &self.user else {
            return Ok(None);
        };

        if let Ok(login) = serde_json::from_value::<LoginResponse>(user.clone()) {
            return login.into_session().map(Some);
        }

        Ok(serde_json::from_value::<Session>(user.clone()).ok())
    }
}
