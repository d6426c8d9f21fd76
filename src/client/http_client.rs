//! Session endpoints of the backend.
//!
//! This module models the three requests the session subsystem makes:
//! the liveness probe, the logout notification and the login exchange.
//! [`SessionApi`] is the seam the prober and terminator depend on, so tests
//! can substitute a scripted implementation for [`HttpSessionApi`].

use crate::SessionConfig;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing;

/// Body of a successful liveness probe.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PingResponse {
    /// Seconds until the server expires the session; may be fractional, negative or null
    #[serde(default)]
    pub remaining_seconds: Option<f64>,

    /// Server time in Unix seconds
    #[serde(default)]
    pub now: Option<i64>,

    /// Last activity the server recorded for the session, in Unix seconds
    #[serde(default)]
    pub last_seen: Option<i64>,
}

/// Credentials posted to the login endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a successful login.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub access_token: String,

    /// Token type, usually "bearer"
    #[serde(default)]
    pub token_type: Option<String>,

    /// Role declared by the server, if any
    #[serde(default)]
    pub role: Option<String>,
}

/// Error types for session endpoint calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the credential (HTTP 401)
    #[error("Session is no longer authorized")]
    Unauthorized,

    /// Any other non-success status
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be read as expected
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if this error means the session is gone.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// The backend calls the session lifecycle depends on.
#[allow(async_fn_in_trait)]
pub trait SessionApi {
    /// Asks the server how long the session behind `token` has left.
    async fn ping(&self, token: &str) -> Result<PingResponse, ApiError>;

    /// Tells the server the session behind `token` is ending.
    async fn logout(&self, token: &str) -> Result<(), ApiError>;
}

/// reqwest-backed implementation of [`SessionApi`].
#[derive(Clone, Debug)]
pub struct HttpSessionApi {
    client: reqwest::Client,
    ping_url: String,
    logout_url: String,
    login_url: String,
}

impl HttpSessionApi {
    /// Creates a client for the backend described by `config`.
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, config: &SessionConfig) -> Self {
        Self {
            client,
            ping_url: config.ping_url(),
            logout_url: config.logout_url(),
            login_url: config.login_url(),
        }
    }

    /// Exchanges email and password for an access token.
    ///
    /// # Returns
    ///
    /// * `Ok(LoginResponse)` - The server accepted the credentials
    /// * `Err(ApiError::Unauthorized)` - The credentials were rejected
    /// * `Err(ApiError)` - Any other failure, with the server's message when available
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        tracing::trace!("Posting login for {}", request.email);

        let response = self.client.post(&self.login_url).json(request).send().await?;
        let response = ensure_success(response).await?;

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl SessionApi for HttpSessionApi {
    async fn ping(&self, token: &str) -> Result<PingResponse, ApiError> {
        let response = self
            .client
            .get(&self.ping_url)
            .bearer_auth(token)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let ping = response
            .json::<PingResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        tracing::trace!("Ping: {:?}s remaining", ping.remaining_seconds);
        Ok(ping)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.logout_url)
            .bearer_auth(token)
            .send()
            .await?;
        ensure_success(response).await?;
        tracing::trace!("Server acknowledged logout");
        Ok(())
    }
}

/// Converts a non-success response into an [`ApiError`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| detail_message(&value))
        .unwrap_or_else(|| format!("HTTP {}", status));
    ApiError::Status { status, message }
}

/// Extracts a human-readable message from an error body.
///
/// Looks at `detail` first (a string, or a list of `{ "msg": ... }` validation
/// entries, of which the first is used), then at `message`.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Array(entries)) => {
            if let Some(msg) = entries
                .first()
                .and_then(|entry| entry.get("msg"))
                .and_then(Value::as_str)
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
