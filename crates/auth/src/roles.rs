//! Role directory: numeric role code ↔ role label ↔ landing path.
//!
//! - No IO
//! - No panics
//! - Every mapping is an exhaustive `match` over a closed enum, so an unmapped
//!   role is a compile error rather than a runtime hole.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tecnoquality_core::{DomainError, DomainResult};

/// Functional role of a user. The authorization currency of the client.
///
/// Serialized as its canonical label (e.g. `"Secretari@"`), never as the
/// numeric code the identity service uses on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrador")]
    Administrator,
    #[serde(rename = "Secretari@")]
    Secretary,
    #[serde(rename = "Medic@")]
    Medic,
    #[serde(rename = "Psicolog@")]
    Psychologist,
    #[serde(rename = "Psicotecnic@")]
    Psychotechnician,
    #[serde(rename = "Documentador")]
    Documenter,
}

impl Role {
    /// All roles, in role-code order.
    pub const ALL: [Role; 6] = [
        Role::Administrator,
        Role::Secretary,
        Role::Medic,
        Role::Psychologist,
        Role::Psychotechnician,
        Role::Documenter,
    ];

    /// Resolve a numeric role code (1..=6) issued by the identity service.
    pub fn from_code(code: i64) -> DomainResult<Self> {
        match code {
            1 => Ok(Role::Administrator),
            2 => Ok(Role::Secretary),
            3 => Ok(Role::Medic),
            4 => Ok(Role::Psychologist),
            5 => Ok(Role::Psychotechnician),
            6 => Ok(Role::Documenter),
            other => Err(DomainError::UnknownRoleCode(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Role::Administrator => 1,
            Role::Secretary => 2,
            Role::Medic => 3,
            Role::Psychologist => 4,
            Role::Psychotechnician => 5,
            Role::Documenter => 6,
        }
    }

    /// Canonical label, as persisted and displayed.
    pub fn label(self) -> &'static str {
        match self {
            Role::Administrator => "Administrador",
            Role::Secretary => "Secretari@",
            Role::Medic => "Medic@",
            Role::Psychologist => "Psicolog@",
            Role::Psychotechnician => "Psicotecnic@",
            Role::Documenter => "Documentador",
        }
    }

    /// The single route this role lands on after login.
    pub fn landing_path(self) -> &'static str {
        match self {
            Role::Administrator => "/Administrador",
            Role::Secretary => "/Secretary",
            Role::Medic => "/Medic",
            Role::Psychologist => "/Psychologist",
            Role::Psychotechnician => "/Psicotecnica",
            Role::Documenter => "/Documentador",
        }
    }

    /// Inverse of [`Role::landing_path`].
    pub fn for_landing_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.landing_path() == path)
    }

    pub fn from_label(label: &str) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.label() == label)
            .ok_or_else(|| DomainError::UnknownRoleLabel(label.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Code → role. Total only over `1..=6`.
pub fn role_label(code: i64) -> DomainResult<Role> {
    Role::from_code(code)
}

/// Role → landing path. Total over every role.
pub fn landing_path(role: Role) -> &'static str {
    role.landing_path()
}
