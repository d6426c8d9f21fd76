//! Liveness probing of the server session.
//!
//! [`LivenessProber`] periodically asks the backend how long the session has
//! left, but only while the user is actually present. Each result updates a
//! [`SessionSnapshot`] that subscribers (the warning modal) render from, and a
//! zero remaining time or an unauthorized answer hands the session to the
//! [`SessionTerminator`].
//!
//! ## Phases
//!
//! ```text
//! Idle ──token──▶ Active ◀──────▶ Warning
//!   ▲               │                │
//!   └──no token─────┤  remaining ≤ 0 or 401
//!                   ▼                ▼
//!               Terminating ──▶ Terminated
//! ```
//!
//! A tick while the user has been idle longer than the activity window makes
//! no network call at all.

use crate::SessionConfig;
use crate::client::activity::ActivityTracker;
use crate::client::credential_store::CredentialStore;
use crate::client::http_client::{PingResponse, SessionApi};
use crate::client::schedule;
use crate::client::terminator::{SessionTerminator, TerminationOutcome, TerminationReason};
use crate::client::warning::should_warn;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing;

/// Lifecycle phase of the probed session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No stored token
    #[default]
    Idle,
    /// Authenticated, outside the warning threshold
    Active,
    /// Authenticated, inside the warning threshold
    Warning,
    /// Termination has started
    Terminating,
    /// Termination finished; absorbing
    Terminated,
}

/// Remaining session time as reported by one probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemainingTimeSample {
    /// Whole seconds left, never negative
    pub remaining_seconds: u64,
    /// When the sample was taken, in epoch milliseconds
    pub sampled_at_ms: u64,
}

impl RemainingTimeSample {
    /// Builds a sample from a probe response.
    ///
    /// Missing, negative or non-numeric values clamp to zero; fractional values round up
    /// so that any positive remainder stays positive.
    pub fn from_response(response: &PingResponse, sampled_at_ms: u64) -> Self {
        let raw = response.remaining_seconds.unwrap_or(0.0);
        let remaining_seconds = if raw > 0.0 { raw.ceil() as u64 } else { 0 };
        Self {
            remaining_seconds,
            sampled_at_ms,
        }
    }

    /// Returns true if the session has no time left.
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }
}

/// Render-facing state of the prober.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Latest sample, cleared when the session ends
    pub sample: Option<RemainingTimeSample>,
    /// Whether the expiry warning should be shown
    pub warning_visible: bool,
}

impl SessionSnapshot {
    /// Seconds left according to the latest sample.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.sample.map(|sample| sample.remaining_seconds)
    }
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No token is stored
    NoSession,
    /// The user is idle; no request was made
    SkippedIdle,
    /// The probe succeeded and the sample was recorded
    Sampled(RemainingTimeSample),
    /// The session was (or already is) terminated
    Terminated,
    /// The probe failed transiently and was ignored
    ProbeFailed,
    /// The prober was disposed; any response was discarded
    Disposed,
}

type Subscriber = Box<dyn Fn(&SessionSnapshot)>;

/// Polls the backend for the remaining session time.
pub struct LivenessProber<A> {
    api: Rc<A>,
    store: CredentialStore,
    activity: Rc<ActivityTracker>,
    terminator: Rc<SessionTerminator<A>>,
    poll_interval: Duration,
    activity_window: Duration,
    warning_threshold_secs: u64,
    snapshot: RefCell<SessionSnapshot>,
    subscribers: RefCell<Vec<Subscriber>>,
    disposed: Cell<bool>,
}

impl<A: SessionApi> LivenessProber<A> {
    pub fn new(
        api: Rc<A>,
        store: CredentialStore,
        activity: Rc<ActivityTracker>,
        terminator: Rc<SessionTerminator<A>>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            api,
            store,
            activity,
            terminator,
            poll_interval: config.poll_interval,
            activity_window: config.activity_window,
            warning_threshold_secs: config.warning_threshold_secs,
            snapshot: RefCell::default(),
            subscribers: RefCell::default(),
            disposed: Cell::new(false),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.snapshot.borrow()
    }

    /// Registers a callback invoked after every snapshot change.
    ///
    /// Callbacks must not register further subscribers.
    pub fn subscribe(&self, subscriber: impl Fn(&SessionSnapshot) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    /// Hides the warning for the current sample.
    pub fn dismiss_warning(&self) {
        if !self.snapshot.borrow().warning_visible {
            return;
        }
        self.update(|snapshot| {
            snapshot.warning_visible = false;
            if snapshot.phase == SessionPhase::Warning {
                snapshot.phase = SessionPhase::Active;
            }
        });
    }

    /// Stops the prober: the polling loop exits and in-flight responses are discarded.
    pub fn dispose(&self) {
        if !self.disposed.replace(true) {
            tracing::trace!("Liveness prober disposed");
        }
    }

    /// Returns true once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Runs one probe cycle.
    pub async fn tick(&self) -> TickOutcome {
        if self.disposed.get() {
            return TickOutcome::Disposed;
        }
        if self.is_ending() {
            return TickOutcome::Terminated;
        }

        let Some(token) = self.store.get().access_token else {
            if *self.snapshot.borrow() != SessionSnapshot::default() {
                tracing::trace!("No stored token, session is idle");
                self.update(|snapshot| *snapshot = SessionSnapshot::default());
            }
            return TickOutcome::NoSession;
        };

        if self.snapshot.borrow().phase == SessionPhase::Idle {
            self.update(|snapshot| snapshot.phase = SessionPhase::Active);
        }

        if !self.activity.is_recent(self.activity_window) {
            tracing::trace!(
                "User idle for {:?}, skipping probe",
                self.activity.idle_duration()
            );
            return TickOutcome::SkippedIdle;
        }

        let result = self.api.ping(&token).await;

        if self.disposed.get() {
            tracing::trace!("Discarding probe response received after disposal");
            return TickOutcome::Disposed;
        }
        if self.is_ending() {
            tracing::trace!("Discarding probe response received during termination");
            return TickOutcome::Terminated;
        }

        match result {
            Ok(response) => {
                let sample = RemainingTimeSample::from_response(&response, self.activity.now_ms());
                if sample.is_expired() {
                    self.terminate(TerminationReason::Expired).await;
                    return TickOutcome::Terminated;
                }

                let warning_visible =
                    should_warn(sample.remaining_seconds, self.warning_threshold_secs);
                self.update(|snapshot| {
                    snapshot.sample = Some(sample);
                    snapshot.warning_visible = warning_visible;
                    snapshot.phase = if warning_visible {
                        SessionPhase::Warning
                    } else {
                        SessionPhase::Active
                    };
                });
                TickOutcome::Sampled(sample)
            }
            Err(e) if e.is_unauthorized() => {
                self.terminate(TerminationReason::Unauthorized).await;
                TickOutcome::Terminated
            }
            Err(e) => {
                tracing::warn!("Liveness probe failed, ignoring this tick: {}", e);
                TickOutcome::ProbeFailed
            }
        }
    }

    /// Terminates the session through the terminator, tracking the phase.
    ///
    /// Only the call that performs the redirect moves the phase; a request made
    /// while termination is under way leaves it untouched.
    pub async fn terminate(&self, reason: TerminationReason) -> TerminationOutcome {
        if self.is_ending() {
            return self.terminator.terminate(reason).await;
        }

        self.update(|snapshot| {
            snapshot.phase = SessionPhase::Terminating;
            snapshot.sample = None;
            snapshot.warning_visible = false;
        });

        let outcome = self.terminator.terminate(reason).await;

        if outcome == TerminationOutcome::Redirected {
            self.update(|snapshot| snapshot.phase = SessionPhase::Terminated);
        }
        outcome
    }

    fn is_ending(&self) -> bool {
        matches!(
            self.snapshot.borrow().phase,
            SessionPhase::Terminating | SessionPhase::Terminated
        )
    }

    /// Ticks immediately and then every poll interval, until disposed or terminated.
    ///
    /// Ticks never overlap: the next interval starts after the previous tick finished.
    pub async fn run(&self) {
        tracing::trace!("Liveness prober started, interval {:?}", self.poll_interval);
        loop {
            match self.tick().await {
                TickOutcome::Terminated | TickOutcome::Disposed => break,
                _ => {}
            }
            schedule::sleep(self.poll_interval).await;
            if self.disposed.get() {
                break;
            }
        }
        tracing::trace!("Liveness prober stopped");
    }

    fn update(&self, change: impl FnOnce(&mut SessionSnapshot)) {
        let snapshot = {
            let mut snapshot = self.snapshot.borrow_mut();
            let before = *snapshot;
            change(&mut *snapshot);
            if *snapshot == before {
                return;
            }
            *snapshot
        };

        for subscriber in self.subscribers.borrow().iter() {
            subscriber(&snapshot);
        }
    }
}
