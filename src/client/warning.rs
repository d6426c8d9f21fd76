//! Expiry warning.
//!
//! The warning is derived from the prober's latest sample and is never stored
//! on its own. [`WarningController`] exposes the two user actions of the modal:
//! stay signed in, or log out now.

use crate::client::activity::ActivityTracker;
use crate::client::http_client::SessionApi;
use crate::client::prober::{LivenessProber, SessionSnapshot};
use crate::client::terminator::{TerminationOutcome, TerminationReason};
use std::rc::Rc;

/// Returns true when `remaining_seconds` is inside the warning threshold.
///
/// # Example
///
/// ```
/// # use dxsession::client::warning::should_warn;
/// assert!(should_warn(60, 60));
/// assert!(!should_warn(61, 60));
/// assert!(!should_warn(0, 60));
/// ```
pub fn should_warn(remaining_seconds: u64, threshold_secs: u64) -> bool {
    remaining_seconds > 0 && remaining_seconds <= threshold_secs
}

/// What the warning modal renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarningView {
    pub visible: bool,
    /// Seconds left to display; zero when there is no sample
    pub remaining_seconds: u64,
}

impl WarningView {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            visible: snapshot.warning_visible,
            remaining_seconds: snapshot.remaining_seconds().unwrap_or(0),
        }
    }
}

/// Actions of the expiry warning.
pub struct WarningController<A> {
    prober: Rc<LivenessProber<A>>,
    activity: Rc<ActivityTracker>,
}

impl<A: SessionApi> WarningController<A> {
    pub fn new(prober: Rc<LivenessProber<A>>, activity: Rc<ActivityTracker>) -> Self {
        Self { prober, activity }
    }

    /// Current view of the warning.
    pub fn view(&self) -> WarningView {
        WarningView::from_snapshot(&self.prober.snapshot())
    }

    /// Keeps the session: counts as user activity and hides the warning.
    ///
    /// No request is made; the next scheduled tick probes as usual.
    pub fn stay(&self) {
        tracing::trace!("User chose to stay signed in");
        self.activity.record();
        self.prober.dismiss_warning();
    }

    /// Ends the session immediately.
    pub async fn logout_now(&self) -> TerminationOutcome {
        tracing::trace!("User chose to log out");
        self.prober.terminate(TerminationReason::UserRequested).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, SessionConfig};
    use crate::client::prober::{SessionPhase, TickOutcome};
    use crate::client::terminator::SessionTerminator;
    use crate::client::test_support::{Fixture, MockApi};
    use std::time::Duration;

    fn controller(fixture: &Fixture) -> (Rc<LivenessProber<MockApi>>, WarningController<MockApi>) {
        let terminator = Rc::new(SessionTerminator::new(
            fixture.api.clone(),
            fixture.store.clone(),
            fixture.navigator.clone(),
            "/login",
        ));
        let prober = Rc::new(LivenessProber::new(
            fixture.api.clone(),
            fixture.store.clone(),
            fixture.activity.clone(),
            terminator,
            &SessionConfig::default(),
        ));
        let controller = WarningController::new(prober.clone(), fixture.activity.clone());
        (prober, controller)
    }

    #[test]
    fn test_should_warn_bounds() {
        assert!(should_warn(1, 60));
        assert!(should_warn(45, 60));
        assert!(should_warn(60, 60));
        assert!(!should_warn(61, 60));
        assert!(!should_warn(0, 60));
    }

    #[test]
    fn test_view_without_sample() {
        let view = WarningView::from_snapshot(&SessionSnapshot::default());
        assert_eq!(view, WarningView::default());
    }

    #[tokio::test]
    async fn test_stay_then_next_sample_recomputes() {
        let fixture = Fixture::signed_in();
        let (prober, controller) = controller(&fixture);
        fixture.api.push_remaining(30.0);
        fixture.api.push_remaining(200.0);
        assert_eq!(fixture.store.get().role, Some(Role::User));

        fixture.clock.advance(Duration::from_secs(2));
        prober.tick().await;
        assert_eq!(
            controller.view(),
            WarningView {
                visible: true,
                remaining_seconds: 30
            }
        );

        let before_stay = fixture.activity.last_activity_ms();
        controller.stay();
        assert!(!controller.view().visible);
        assert!(fixture.activity.last_activity_ms() > before_stay);
        assert_eq!(fixture.api.ping_calls.get(), 1);

        fixture.clock.advance(Duration::from_secs(10));
        assert!(matches!(prober.tick().await, TickOutcome::Sampled(_)));
        assert_eq!(
            controller.view(),
            WarningView {
                visible: false,
                remaining_seconds: 200
            }
        );
    }

    #[tokio::test]
    async fn test_stay_makes_idle_user_probeable_again() {
        let fixture = Fixture::signed_in();
        let (prober, controller) = controller(&fixture);
        fixture.api.push_remaining(30.0);
        fixture.api.push_remaining(25.0);

        prober.tick().await;
        fixture.clock.advance(Duration::from_secs(20));
        assert_eq!(prober.tick().await, TickOutcome::SkippedIdle);

        controller.stay();
        prober.tick().await;

        assert_eq!(fixture.api.ping_calls.get(), 2);
        // A fresh sample inside the threshold shows the warning again
        assert_eq!(
            controller.view(),
            WarningView {
                visible: true,
                remaining_seconds: 25
            }
        );
    }

    #[tokio::test]
    async fn test_logout_now_terminates() {
        let fixture = Fixture::signed_in();
        let (prober, controller) = controller(&fixture);
        fixture.api.push_remaining(30.0);
        prober.tick().await;

        let outcome = controller.logout_now().await;

        assert_eq!(outcome, TerminationOutcome::Redirected);
        assert_eq!(fixture.api.logout_calls.get(), 1);
        assert!(!fixture.store.get().is_authenticated());
        assert_eq!(fixture.navigator.count(), 1);
        assert_eq!(prober.snapshot().phase, SessionPhase::Terminated);
        assert!(!controller.view().visible);
    }

    #[tokio::test]
    async fn test_logout_now_while_expiring_redirects_once() {
        let fixture = Fixture::signed_in();
        let (prober, controller) = controller(&fixture);
        fixture.api.push_remaining(0.0);

        let (tick, logout) = tokio::join!(prober.tick(), controller.logout_now());

        // The user's logout started first while the probe was still in flight
        assert_eq!(logout, TerminationOutcome::Redirected);
        assert_eq!(tick, TickOutcome::Terminated);
        assert_eq!(fixture.api.logout_calls.get(), 1);
        assert_eq!(fixture.navigator.count(), 1);
    }
}
