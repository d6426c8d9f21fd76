//! Authorization roles recognized by the client.
//!
//! The set is closed: anything the server or a token carries that is not one of
//! these values is treated as "no role" rather than passed through.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse authorization level of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator with access to the admin area
    Admin,
    /// Regular user
    User,
}

impl Role {
    /// Parses a raw role string, case-insensitively.
    ///
    /// Only an exact (lower-cased) match of `"admin"` or `"user"` is accepted.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxsession::Role;
    /// assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    /// assert_eq!(Role::parse("user"), Some(Role::User));
    /// assert_eq!(Role::parse("superuser"), None);
    /// assert_eq!(Role::parse(""), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Returns the persisted/wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
