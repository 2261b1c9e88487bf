use serde::{Deserialize, Serialize};

use tecnoquality_core::UserId;

use crate::Role;

/// The persisted proof of who is currently using the client.
///
/// Exactly three fields, serialized under the storage field names
/// (`rol_usuario`, `nombre_usuario`, `id_usuario`). Unknown fields are ignored
/// when reading, and nothing else is ever written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "rol_usuario")]
    pub role: Role,

    #[serde(rename = "nombre_usuario")]
    pub display_name: String,

    #[serde(rename = "id_usuario")]
    pub user_id: UserId,
}

impl Session {
    pub fn new(role: Role, display_name: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            role,
            display_name: display_name.into(),
            user_id: user_id.into(),
        }
    }

    pub fn landing_path(&self) -> &'static str {
        self.role.landing_path()
    }
}
