//! Client-side session lifecycle.
//!
//! This module provides the browser half of session management:
//! - Credential persistence in browser localStorage
//! - Role resolution from access token payloads
//! - User activity tracking
//! - Liveness probing with an expiry warning
//! - Forced logout and redirect
//! - Route authorization guards
//! - A Dioxus provider hook and components tying it all together
//!
//! Everything compiles on native targets too; browser-only effects are
//! replaced by logging stubs there.
//!
//! # Example
//!
//! ```rust,ignore
//! use dxsession::SessionConfig;
//! use dxsession::client::{use_session, use_session_provider, SessionWarningModal};
//!
//! #[component]
//! fn App() -> Element {
//!     use_session_provider(SessionConfig::from_env_or_default());
//!     rsx! {
//!         SessionWarningModal {}
//!         Router::<Route> {}
//!     }
//! }
//!
//! #[component]
//! fn Header() -> Element {
//!     let session = use_session();
//!     rsx! { button { onclick: move |_| session.logout_now(), "Sign out" } }
//! }
//! ```

pub mod activity;
pub mod clock;
pub mod credential_store;
pub mod guards;
pub mod http_client;
pub mod jwt;
pub mod navigator;
pub mod prober;
pub mod schedule;
pub mod terminator;
pub mod use_session;
pub mod warning;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types and functions
pub use credential_store::{CredentialBackend, CredentialStore, LocalStorageBackend, MemoryBackend};
pub use guards::{Access, GuardDecision, RouteTable, authorize};
pub use http_client::{ApiError, HttpSessionApi, SessionApi};
pub use jwt::{decode_token_claims, resolve_role};
pub use prober::{LivenessProber, SessionPhase, SessionSnapshot};
pub use terminator::{SessionTerminator, TerminationReason};
pub use use_session::{Guarded, SessionContext, SessionWarningModal, use_session, use_session_provider};
pub use warning::{WarningController, WarningView};
