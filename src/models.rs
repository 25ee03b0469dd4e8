use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Identity Schemas ---

/// Role
///
/// The closed set of role tags a dashboard user can hold. Adding a role means updating
/// both the route tree guards and the menu configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Operador,
    Vendedor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operador, Role::Vendedor];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operador => "operador",
            Role::Vendedor => "vendedor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Role tags are matched exactly; `Admin` is not `admin`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// User
///
/// The authenticated identity held by the session. The catalog API spells the fields
/// `nombre` and `rol`; both spellings are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "rol")]
    pub role: Role,
}

impl User {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

// --- Request / Response Payloads ---

/// LoginRequest
///
/// Credentials posted by the login form (`POST /login`) or the JSON API
/// (`POST /api/session`). The password is forwarded to the identity provider and
/// never logged.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@tienda.local")]
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// LoginResponse
///
/// Returned by `POST /api/session`. The token is the same value stored in the
/// session cookie and may be sent back as a Bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
