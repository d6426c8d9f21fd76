//! Session lifecycle configuration.
//!
//! This module provides the configuration shared by every session component:
//! the backend base URL, polling cadence and thresholds, persisted storage keys,
//! and the entry/landing paths used for redirects.

use crate::Role;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed cadence of liveness probe ticks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How long after the last interaction the user still counts as present.
pub const ACTIVITY_WINDOW: Duration = Duration::from_secs(15);

/// Remaining-time cutoff, in seconds, below which the expiry warning is shown.
pub const WARNING_THRESHOLD_SECS: u64 = 60;

/// Backend URL used when none is configured at compile time.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Keys under which the credential is persisted in browser storage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key holding the raw access token
    pub token: String,
    /// Key holding the role string
    pub role: String,
    /// Key of the legacy JSON record `{"token": ..., "role": ...}`
    pub legacy: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "dc_token".to_string(),
            role: "dc_role".to_string(),
            legacy: "auth".to_string(),
        }
    }
}

/// Configuration for the session lifecycle manager.
///
/// # Fields
///
/// - `api_base_url`: backend origin, without trailing slash
/// - `poll_interval`: cadence of liveness probes
/// - `activity_window`: idle time after which probes are skipped
/// - `warning_threshold_secs`: remaining time at which the warning appears
/// - `storage`: persisted storage keys
/// - `login_path`, `admin_landing`, `user_landing`: redirect targets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Backend base URL (e.g., "https://api.example.com")
    pub api_base_url: String,

    /// Interval between liveness probe ticks
    pub poll_interval: Duration,

    /// Maximum idle duration for which a tick still probes the backend
    pub activity_window: Duration,

    /// Warning threshold in seconds
    pub warning_threshold_secs: u64,

    /// Persisted storage keys
    pub storage: StorageKeys,

    /// Unauthenticated entry point
    pub login_path: String,

    /// Default landing area for administrators
    pub admin_landing: String,

    /// Default landing area for regular users
    pub user_landing: String,
}

impl SessionConfig {
    /// Creates a configuration for the given backend with the standard cadence and paths.
    ///
    /// Trailing slashes on the URL are removed.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxsession::SessionConfig;
    /// let config = SessionConfig::new("https://api.example.com/");
    /// assert_eq!(config.api_base_url, "https://api.example.com");
    /// assert_eq!(config.login_path, "/login");
    /// ```
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            api_base_url,
            poll_interval: POLL_INTERVAL,
            activity_window: ACTIVITY_WINDOW,
            warning_threshold_secs: WARNING_THRESHOLD_SECS,
            storage: StorageKeys::default(),
            login_path: "/login".to_string(),
            admin_landing: "/admin".to_string(),
            user_landing: "/main".to_string(),
        }
    }

    /// Loads the configuration from the compile-time `DXSESSION_API_URL` variable.
    ///
    /// Returns `None` if the variable was not set when the crate was built
    /// (see `build.rs` for how `.env` files are picked up).
    pub fn from_env() -> Option<Self> {
        let api_base_url = option_env!("DXSESSION_API_URL")?;
        if api_base_url.trim().is_empty() {
            return None;
        }
        Some(Self::new(api_base_url))
    }

    /// Loads the configuration from the environment, falling back to [`DEFAULT_API_URL`].
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|| {
            tracing::warn!(
                "DXSESSION_API_URL not set at compile time, using {}",
                DEFAULT_API_URL
            );
            Self::new(DEFAULT_API_URL)
        })
    }

    /// Returns the liveness probe endpoint URL.
    ///
    /// # Example
    ///
    /// ```
    /// # use dxsession::SessionConfig;
    /// let config = SessionConfig::new("http://localhost:8000");
    /// assert_eq!(config.ping_url(), "http://localhost:8000/auth/ping");
    /// ```
    pub fn ping_url(&self) -> String {
        format!("{}/auth/ping", self.api_base_url)
    }

    /// Returns the logout notification endpoint URL.
    pub fn logout_url(&self) -> String {
        format!("{}/auth/logout", self.api_base_url)
    }

    /// Returns the login endpoint URL.
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.api_base_url)
    }

    /// Returns the default landing area for a role.
    ///
    /// A missing role lands in the regular user area.
    pub fn landing_for(&self, role: Option<Role>) -> &str {
        match role {
            Some(Role::Admin) => &self.admin_landing,
            Some(Role::User) | None => &self.user_landing,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
