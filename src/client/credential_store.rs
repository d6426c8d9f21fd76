//! Persistent credential storage.
//!
//! This module keeps the access token and role across page reloads:
//! 1. **Backend**: a key/value [`CredentialBackend`], browser `localStorage` in
//!    production and [`MemoryBackend`] in tests
//! 2. **Store**: [`CredentialStore`], the only component allowed to read or
//!    mutate the persisted credential
//!
//! ## Storage Strategy
//!
//! - On login: store the token and the resolved role under their fixed keys
//! - On read: use the fixed keys, falling back to the legacy `auth` JSON record
//! - On logout/expiry: remove every key, including the legacy record
//! - Storage unavailable: reads return an anonymous credential, writes are dropped

use crate::client::http_client::LoginResponse;
use crate::client::jwt::{resolve_role, role_from_token};
use crate::config::StorageKeys;
use crate::{Role, SessionCredential};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing;

/// Key/value persistence used by the credential store.
///
/// Implementations never fail loudly: unavailable storage reads as empty.
pub trait CredentialBackend {
    /// Returns true if the underlying storage can be used.
    fn is_available(&self) -> bool;

    /// Reads a value.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Writes a value.
    fn set_item(&self, key: &str, value: &str);

    /// Removes a value.
    fn remove_item(&self, key: &str);
}

/// Browser `localStorage` backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
impl LocalStorageBackend {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl CredentialBackend for LocalStorageBackend {
    fn is_available(&self) -> bool {
        Self::storage().is_some()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    tracing::warn!("Failed to write '{}' to localStorage", key);
                }
            }
            None => tracing::warn!("localStorage unavailable, dropping write of '{}'", key),
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Non-WASM stub: there is no localStorage outside the browser.
#[cfg(not(target_arch = "wasm32"))]
impl CredentialBackend for LocalStorageBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, key: &str, _value: &str) {
        tracing::warn!("localStorage not supported in non-WASM builds, dropping '{}'", key);
    }

    fn remove_item(&self, _key: &str) {}
}

/// In-memory backend for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryBackend {
    /// Creates an empty, available backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that behaves like disabled browser storage.
    pub fn unavailable() -> Self {
        Self {
            items: RefCell::default(),
            unavailable: true,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl CredentialBackend for MemoryBackend {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn get_item(&self, key: &str) -> Option<String> {
        if self.unavailable {
            return None;
        }
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        if self.unavailable {
            return;
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Legacy persisted record, written by earlier releases under a single key.
#[derive(Debug, Default, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Owner of the persisted session credential.
///
/// Cloning is cheap and every clone reads and writes the same backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Rc<dyn CredentialBackend>,
    keys: StorageKeys,
}

impl CredentialStore {
    /// Creates a store over the given backend and keys.
    pub fn new(backend: Rc<dyn CredentialBackend>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// Creates a store over browser `localStorage` with the given keys.
    pub fn local_storage(keys: StorageKeys) -> Self {
        Self::new(Rc::new(LocalStorageBackend), keys)
    }

    /// Returns the current credential.
    ///
    /// Missing or empty values read as `None`. A stored role that is missing or
    /// unrecognized is derived from the token instead.
    pub fn get(&self) -> SessionCredential {
        if !self.backend.is_available() {
            tracing::warn!("Credential storage unavailable, treating session as anonymous");
            return SessionCredential::anonymous();
        }

        let token = self
            .backend
            .get_item(&self.keys.token)
            .filter(|t| !t.is_empty());
        let role = self
            .backend
            .get_item(&self.keys.role)
            .filter(|r| !r.is_empty());

        if token.is_none() && role.is_none() {
            return self.read_legacy();
        }

        Self::credential_from(token, role.as_deref())
    }

    /// Persists the credential; a missing or empty token removes the stored token,
    /// a missing role removes the stored role.
    pub fn set(&self, access_token: Option<&str>, role: Option<Role>) {
        match access_token.filter(|t| !t.is_empty()) {
            Some(token) => self.backend.set_item(&self.keys.token, token),
            None => self.backend.remove_item(&self.keys.token),
        }

        match role {
            Some(role) => self.backend.set_item(&self.keys.role, role.as_str()),
            None => self.backend.remove_item(&self.keys.role),
        }

        self.backend.remove_item(&self.keys.legacy);
        tracing::trace!(
            "Stored credential: token={}, role={:?}",
            access_token.is_some_and(|t| !t.is_empty()),
            role
        );
    }

    /// Removes the persisted credential. Safe to call repeatedly.
    pub fn clear(&self) {
        tracing::trace!("Clearing stored credential");
        self.set(None, None);
    }

    /// Stores the result of a successful login.
    ///
    /// The role is the server's declared role when recognized, otherwise the role
    /// carried by the token, otherwise `None`.
    pub fn establish(&self, login: &LoginResponse) -> SessionCredential {
        let role = resolve_role(Some(&login.access_token), login.role.as_deref());
        self.set(Some(&login.access_token), role);
        SessionCredential::new(Some(login.access_token.clone()), role)
    }

    fn credential_from(token: Option<String>, stored_role: Option<&str>) -> SessionCredential {
        let role = stored_role
            .and_then(Role::parse)
            .or_else(|| token.as_deref().and_then(role_from_token));
        SessionCredential::new(token, role)
    }

    fn read_legacy(&self) -> SessionCredential {
        let Some(raw) = self.backend.get_item(&self.keys.legacy) else {
            return SessionCredential::anonymous();
        };

        match serde_json::from_str::<LegacyRecord>(&raw) {
            Ok(record) => {
                tracing::trace!("Read credential from legacy storage record");
                Self::credential_from(record.token, record.role.as_deref())
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable legacy credential record: {}", e);
                SessionCredential::anonymous()
            }
        }
    }
}
