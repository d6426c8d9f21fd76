//! Session termination.
//!
//! [`SessionTerminator`] ends a session exactly once: it notifies the server,
//! clears the stored credential and performs a full-page redirect to the login
//! entry point. Every step is best-effort; a failing step never blocks the next.

use crate::client::credential_store::CredentialStore;
use crate::client::http_client::SessionApi;
use crate::client::navigator::Navigator;
use std::cell::Cell;
use std::rc::Rc;
use tracing;

/// Why a session is being terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The server reported no remaining time
    Expired,
    /// The server rejected the credential
    Unauthorized,
    /// The user chose to log out
    UserRequested,
}

/// Result of a termination request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// This call performed the redirect
    Redirected,
    /// Another call already started termination; only the store was cleared
    AlreadyTerminating,
}

/// Ends the session and redirects to the login entry point.
pub struct SessionTerminator<A> {
    api: Rc<A>,
    store: CredentialStore,
    navigator: Rc<dyn Navigator>,
    login_path: String,
    started: Cell<bool>,
}

impl<A: SessionApi> SessionTerminator<A> {
    pub fn new(
        api: Rc<A>,
        store: CredentialStore,
        navigator: Rc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            navigator,
            login_path: login_path.into(),
            started: Cell::new(false),
        }
    }

    /// Returns true once any termination has started.
    pub fn has_started(&self) -> bool {
        self.started.get()
    }

    /// Terminates the session.
    ///
    /// Only the first call notifies the server and redirects; later or concurrent
    /// calls just clear the store again. The server is not notified when the
    /// reason is [`TerminationReason::Unauthorized`], since it already rejected
    /// the token.
    pub async fn terminate(&self, reason: TerminationReason) -> TerminationOutcome {
        if self.started.replace(true) {
            tracing::trace!("Termination already in progress ({:?})", reason);
            self.store.clear();
            return TerminationOutcome::AlreadyTerminating;
        }

        tracing::trace!("Terminating session: {:?}", reason);

        let token = self.store.get().access_token;
        if reason != TerminationReason::Unauthorized
            && let Some(token) = token
            && let Err(e) = self.api.logout(&token).await
        {
            tracing::warn!("Logout notification failed, continuing: {}", e);
        }

        self.store.clear();
        self.navigator.replace(&self.login_path);
        TerminationOutcome::Redirected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::Fixture;

    fn terminator(fixture: &Fixture) -> SessionTerminator<crate::client::test_support::MockApi> {
        SessionTerminator::new(
            fixture.api.clone(),
            fixture.store.clone(),
            fixture.navigator.clone(),
            "/login",
        )
    }

    #[tokio::test]
    async fn test_expiry_notifies_clears_and_redirects() {
        let fixture = Fixture::signed_in();
        let terminator = terminator(&fixture);

        let outcome = terminator.terminate(TerminationReason::Expired).await;

        assert_eq!(outcome, TerminationOutcome::Redirected);
        assert_eq!(fixture.api.logout_calls.get(), 1);
        assert!(!fixture.store.get().is_authenticated());
        assert_eq!(*fixture.navigator.redirects.borrow(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_notification_still_clears_and_redirects() {
        let fixture = Fixture::signed_in();
        fixture.api.logout_fails.set(true);
        let terminator = terminator(&fixture);

        terminator.terminate(TerminationReason::UserRequested).await;

        assert_eq!(fixture.api.logout_calls.get(), 1);
        assert!(fixture.backend.is_empty());
        assert_eq!(fixture.navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_skips_notification() {
        let fixture = Fixture::signed_in();
        let terminator = terminator(&fixture);

        terminator.terminate(TerminationReason::Unauthorized).await;

        assert_eq!(fixture.api.logout_calls.get(), 0);
        assert!(!fixture.store.get().is_authenticated());
        assert_eq!(fixture.navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_without_token_skips_notification() {
        let fixture = Fixture::new();
        let terminator = terminator(&fixture);

        terminator.terminate(TerminationReason::UserRequested).await;

        assert_eq!(fixture.api.logout_calls.get(), 0);
        assert_eq!(fixture.navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_termination_redirects_once() {
        let fixture = Fixture::signed_in();
        let terminator = terminator(&fixture);

        let (first, second) = tokio::join!(
            terminator.terminate(TerminationReason::Expired),
            terminator.terminate(TerminationReason::UserRequested),
        );

        assert_eq!(first, TerminationOutcome::Redirected);
        assert_eq!(second, TerminationOutcome::AlreadyTerminating);
        assert_eq!(fixture.api.logout_calls.get(), 1);
        assert_eq!(fixture.navigator.count(), 1);
        assert!(terminator.has_started());
    }

    #[tokio::test]
    async fn test_repeated_termination_is_safe() {
        let fixture = Fixture::signed_in();
        let terminator = terminator(&fixture);

        terminator.terminate(TerminationReason::Expired).await;
        let again = terminator.terminate(TerminationReason::Expired).await;

        assert_eq!(again, TerminationOutcome::AlreadyTerminating);
        assert_eq!(fixture.navigator.count(), 1);
        assert!(fixture.backend.is_empty());
    }
}
