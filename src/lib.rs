//! # dxsession
//!
//! Client-side session lifecycle management for Dioxus web applications.
//!
//! The crate keeps a browser session honest: it tracks whether the server still
//! considers the session valid, infers the user's role, warns before the session
//! expires from inactivity and forces a logout when it does.
//!
//! ## Overview
//!
//! - **Shared types** (`SessionConfig`, `SessionCredential`, `Role`) - Available in all contexts
//! - **Client module** - Credential storage, role resolution, activity tracking,
//!   liveness probing, expiry warning, termination and route guards
//!
//! ## How a session is kept alive
//!
//! Every 10 seconds the liveness prober checks whether the user interacted with
//! the page during the last 15 seconds. Only then does it ask the backend
//! (`GET /auth/ping`) how long the session has left:
//!
//! - more than 60 seconds: nothing to do
//! - 60 seconds or less: the expiry warning is shown
//! - no time left, or HTTP 401: the session is terminated
//!
//! An idle user is never probed, so the server-side inactivity timeout runs out
//! on its own; the next probe after the user returns reports it.
//!
//! Termination notifies the server (`POST /auth/logout`, best-effort), clears the
//! stored credential and replaces the page with the login entry point, exactly once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dioxus::prelude::*;
//! use dxsession::SessionConfig;
//! use dxsession::client::{Access, Guarded, SessionWarningModal, use_session_provider};
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
//! fn AdminArea() -> Element {
//!     let nav = navigator();
//!     rsx! {
//!         Guarded {
//!             access: Access::admin_only(),
//!             on_redirect: move |path: String| { nav.replace(path); },
//!             AdminDashboard {}
//!         }
//!     }
//! }
//! ```
//!
//! ## Platform Compatibility
//!
//! | Feature | WASM (Browser) | Native |
//! |---------|----------------|--------|
//! | Shared types | ✅ | ✅ |
//! | Credential storage | localStorage | unavailable (anonymous) |
//! | Activity listeners | window listeners | no-op |
//! | Polling timer | gloo-timers | tokio |
//! | Redirect | `location.replace` | logged |
//!
//! ## Configuration
//!
//! The backend URL is read at compile time from `DXSESSION_API_URL`, either from
//! the environment or from a `.env` file next to `Cargo.toml` (see `.env.example`).

pub mod config;
pub mod credential;
pub mod role;

pub mod client;

pub use config::SessionConfig;
pub use credential::SessionCredential;
pub use role::Role;
