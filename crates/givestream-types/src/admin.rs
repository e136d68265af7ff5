//! administrator account type.
//!
//! admins are created via the CLI (there is no signup endpoint) and
//! authenticate with email + password to obtain api tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, Error};

/// unique identifier for an admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(pub u64);

impl From<u64> for AdminId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AdminId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// account role. only one exists today, so an authenticated account
/// is always an admin; the enum keeps the check explicit at call sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// full moderation access.
    #[default]
    Admin,
}

impl Role {
    /// the role as its stored/wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            other => Err(Error::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// an administrator account.
///
/// the password hash never appears in serialized output.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    /// unique identifier.
    pub id: AdminId,

    /// human-readable name.
    pub name: String,

    /// login email, stored lowercased, unique.
    pub email: String,

    /// salted argon2id hash of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// account role.
    pub role: Role,

    /// when the account was created.
    pub created_at: DateTime<Utc>,
}

/// input for creating an admin account.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// human-readable name.
    pub name: String,

    /// login email; stored lowercased.
    pub email: Email,

    /// already-hashed password.
    pub password_hash: String,

    /// account role.
    pub role: Role,
}
