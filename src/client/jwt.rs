//! Access token payload decoding and role resolution.
//!
//! This module decodes the payload segment of a JWT-shaped access token and
//! derives the caller's role from it when the server did not declare one.
//! It performs no signature verification; the server remains the authority on
//! whether a token is valid.

use crate::Role;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};
use tracing;

/// Claim names that may carry the role, in lookup order.
pub const ROLE_CLAIM_ALIASES: [&str; 3] = ["role", "rol", "perfil"];

/// Error types for token payload decoding.
#[derive(Debug, thiserror::Error)]
pub enum TokenDecodeError {
    /// The token has no (or an empty) payload segment
    #[error("Token has no payload segment")]
    MissingPayload,

    /// The payload segment is not valid base64
    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload is not valid JSON
    #[error("Failed to parse token claims: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not an object
    #[error("Token claims are not a JSON object")]
    NotAnObject,
}

/// Claims decoded from an access token payload.
///
/// The raw claim map is kept as-is so that unexpected claim types never make
/// the whole payload unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// Subject of the token, if present as a string.
    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// Token identifier, if present as a string.
    pub fn jti(&self) -> Option<&str> {
        self.claims.get("jti").and_then(Value::as_str)
    }

    /// Issued-at timestamp in Unix seconds, if present as an integer.
    pub fn iat(&self) -> Option<i64> {
        self.claims.get("iat").and_then(Value::as_i64)
    }

    /// Expiration timestamp in Unix seconds, if present as an integer.
    pub fn exp(&self) -> Option<i64> {
        self.claims.get("exp").and_then(Value::as_i64)
    }

    /// Returns the raw role claim.
    ///
    /// The first alias in [`ROLE_CLAIM_ALIASES`] with a non-null value wins;
    /// if that value is not a string there is no role claim.
    pub fn role_claim(&self) -> Option<&str> {
        ROLE_CLAIM_ALIASES
            .iter()
            .filter_map(|alias| self.claims.get(*alias))
            .find(|value| !value.is_null())
            .and_then(Value::as_str)
    }

    /// Returns the recognized role carried by the token, if any.
    pub fn role(&self) -> Option<Role> {
        self.role_claim().and_then(Role::parse)
    }

    /// Looks up an arbitrary claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

/// Decodes the payload segment of a token into its claims.
///
/// Accepts base64url and standard base64 alphabets, with or without padding.
///
/// # Arguments
///
/// * `token` - The token string, `header.payload[.signature]`
///
/// # Returns
///
/// * `Ok(TokenClaims)` - Successfully decoded claims
/// * `Err(TokenDecodeError)` - The token is malformed
///
/// # Example
///
/// ```ignore
/// let claims = decode_token_claims(&access_token)?;
/// let role = claims.role();
/// ```
pub fn decode_token_claims(token: &str) -> Result<TokenClaims, TokenDecodeError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(TokenDecodeError::MissingPayload)?;

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let decoded_bytes = URL_SAFE_NO_PAD.decode(normalized)?;

    match serde_json::from_slice::<Value>(&decoded_bytes)? {
        Value::Object(claims) => Ok(TokenClaims { claims }),
        _ => Err(TokenDecodeError::NotAnObject),
    }
}

/// Derives the role carried by a token.
///
/// Every decoding failure resolves to `None`.
pub fn role_from_token(token: &str) -> Option<Role> {
    match decode_token_claims(token) {
        Ok(claims) => {
            let role = claims.role();
            if role.is_none() {
                tracing::trace!(
                    "Token carries no recognized role claim: {:?}",
                    claims.role_claim()
                );
            }
            role
        }
        Err(e) => {
            tracing::trace!("Could not decode token payload: {}", e);
            None
        }
    }
}

/// Resolves the session role from an optional server-declared role and the token.
///
/// A recognized declared role wins. A missing or unrecognized declared role falls
/// back to the token's role claim; if that also fails the role is `None`.
///
/// # Example
///
/// ```
/// # use dxsession::Role;
/// # use dxsession::client::jwt::resolve_role;
/// assert_eq!(resolve_role(Some("opaque"), Some("Admin")), Some(Role::Admin));
/// assert_eq!(resolve_role(Some("opaque"), None), None);
/// assert_eq!(resolve_role(None, None), None);
/// ```
pub fn resolve_role(token: Option<&str>, declared: Option<&str>) -> Option<Role> {
    if let Some(role) = declared.and_then(Role::parse) {
        return Some(role);
    }
    if let Some(raw) = declared.filter(|raw| !raw.is_empty()) {
        tracing::warn!(
            "Ignoring unrecognized server-declared role '{}', deriving from token",
            raw
        );
    }
    token.and_then(role_from_token)
}
