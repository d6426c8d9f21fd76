//! The session credential held by the client.
//!
//! This is a shared type used by the credential store, the liveness prober and
//! the route guards.

use crate::Role;
use serde::{Deserialize, Serialize};

/// Current access token and role of the browser session.
///
/// Absence is always `None`: an empty token string is never stored here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Opaque bearer token proving an authenticated session
    pub access_token: Option<String>,
    /// Authorization role, `None` when unknown or unrecognized
    pub role: Option<Role>,
}

impl SessionCredential {
    /// Creates a credential, normalising an empty token to `None`.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxsession::{Role, SessionCredential};
    /// let credential = SessionCredential::new(Some("token".to_string()), Some(Role::User));
    /// assert!(credential.is_authenticated());
    ///
    /// let empty = SessionCredential::new(Some(String::new()), None);
    /// assert!(!empty.is_authenticated());
    /// ```
    pub fn new(access_token: Option<String>, role: Option<Role>) -> Self {
        Self {
            access_token: access_token.filter(|token| !token.is_empty()),
            role,
        }
    }

    /// Returns a credential with neither token nor role.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns true when an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns true when the credential carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Borrows the access token, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}
