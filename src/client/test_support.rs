//! Fakes shared by the client module tests.

use crate::client::activity::ActivityTracker;
use crate::client::clock::ManualClock;
use crate::client::credential_store::{CredentialStore, MemoryBackend};
use crate::client::http_client::{ApiError, PingResponse, SessionApi};
use crate::client::navigator::Navigator;
use crate::config::StorageKeys;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Creates an unsigned JWT carrying `payload` verbatim.
pub(crate) fn create_test_jwt(payload: &str) -> String {
    let header = r#"{"alg":"RS256","typ":"JWT"}"#;
    let header_b64 = URL_SAFE_NO_PAD.encode(header.as_bytes());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    let signature = "dummy_signature";

    format!("{}.{}.{}", header_b64, payload_b64, signature)
}

/// Scripted ping outcome.
pub(crate) enum PingScript {
    Remaining(f64),
    Unauthorized,
    Transient,
}

/// [`SessionApi`] answering from a queue of scripted results.
///
/// An exhausted queue answers with a transient failure.
#[derive(Default)]
pub(crate) struct MockApi {
    pings: RefCell<VecDeque<PingScript>>,
    pub ping_calls: Cell<usize>,
    pub logout_calls: Cell<usize>,
    pub logout_fails: Cell<bool>,
    pub last_token: RefCell<Option<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ping(&self, script: PingScript) {
        self.pings.borrow_mut().push_back(script);
    }

    pub fn push_remaining(&self, seconds: f64) {
        self.push_ping(PingScript::Remaining(seconds));
    }
}

impl SessionApi for MockApi {
    async fn ping(&self, token: &str) -> Result<PingResponse, ApiError> {
        self.ping_calls.set(self.ping_calls.get() + 1);
        *self.last_token.borrow_mut() = Some(token.to_string());
        let script = self.pings.borrow_mut().pop_front();

        // Let other tasks interleave, as a real request would
        tokio::task::yield_now().await;

        match script {
            Some(PingScript::Remaining(seconds)) => Ok(PingResponse {
                remaining_seconds: Some(seconds),
                ..PingResponse::default()
            }),
            Some(PingScript::Unauthorized) => Err(ApiError::Unauthorized),
            Some(PingScript::Transient) | None => Err(ApiError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
        }
    }

    async fn logout(&self, _token: &str) -> Result<(), ApiError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        tokio::task::yield_now().await;

        if self.logout_fails.get() {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

/// [`Navigator`] remembering every redirect.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    pub redirects: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn count(&self) -> usize {
        self.redirects.borrow().len()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.redirects.borrow_mut().push(path.to_string());
    }
}

/// Everything a session component needs, wired to fakes.
pub(crate) struct Fixture {
    pub api: Rc<MockApi>,
    pub backend: Rc<MemoryBackend>,
    pub store: CredentialStore,
    pub clock: Rc<ManualClock>,
    pub activity: Rc<ActivityTracker>,
    pub navigator: Rc<RecordingNavigator>,
}

impl Fixture {
    /// Creates a fixture whose clock starts at an arbitrary non-zero instant.
    pub fn new() -> Self {
        let backend = Rc::new(MemoryBackend::new());
        let clock = Rc::new(ManualClock::new(1_700_000_000_000));
        Self {
            api: Rc::new(MockApi::new()),
            store: CredentialStore::new(backend.clone(), StorageKeys::default()),
            backend,
            activity: Rc::new(ActivityTracker::new(clock.clone())),
            clock,
            navigator: Rc::new(RecordingNavigator::default()),
        }
    }

    /// Creates a fixture with a stored user session.
    pub fn signed_in() -> Self {
        let fixture = Self::new();
        fixture
            .store
            .set(Some("session-token"), Some(crate::Role::User));
        fixture
    }
}
