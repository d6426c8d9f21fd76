//! Dioxus integration of the session lifecycle.
//!
//! [`use_session_provider`] wires every session component together once at
//! the application root: it restores the stored credential, attaches the
//! activity listeners, runs the liveness prober for as long as the root is
//! mounted and publishes each prober snapshot into a signal. Descendants reach
//! the session through [`use_session`].

use crate::client::activity::{ActivityListeners, ActivityTracker};
use crate::client::clock::SystemClock;
use crate::client::credential_store::CredentialStore;
use crate::client::guards::{Access, GuardDecision, authorize};
use crate::client::http_client::{ApiError, HttpSessionApi, LoginRequest};
use crate::client::navigator::BrowserNavigator;
use crate::client::prober::{LivenessProber, SessionSnapshot};
use crate::client::terminator::SessionTerminator;
use crate::client::warning::{WarningController, WarningView};
use crate::{SessionConfig, SessionCredential};
use dioxus::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing;

/// Session handle shared through the Dioxus context.
#[derive(Clone)]
pub struct SessionContext {
    config: Rc<SessionConfig>,
    api: Rc<HttpSessionApi>,
    store: CredentialStore,
    activity: Rc<ActivityTracker>,
    prober: Rc<LivenessProber<HttpSessionApi>>,
    warning: Rc<WarningController<HttpSessionApi>>,
    snapshot: Signal<SessionSnapshot>,
}

impl SessionContext {
    fn new(config: SessionConfig, snapshot: Signal<SessionSnapshot>) -> Self {
        let api = Rc::new(HttpSessionApi::new(&config));
        let store = CredentialStore::local_storage(config.storage.clone());
        let activity = Rc::new(ActivityTracker::new(Rc::new(SystemClock)));
        let terminator = Rc::new(SessionTerminator::new(
            api.clone(),
            store.clone(),
            Rc::new(BrowserNavigator),
            config.login_path.clone(),
        ));
        let prober = Rc::new(LivenessProber::new(
            api.clone(),
            store.clone(),
            activity.clone(),
            terminator,
            &config,
        ));
        prober.subscribe(move |latest| {
            let mut snapshot = snapshot;
            snapshot.set(*latest);
        });
        let warning = Rc::new(WarningController::new(prober.clone(), activity.clone()));

        Self {
            config: Rc::new(config),
            api,
            store,
            activity,
            prober,
            warning,
            snapshot,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reads the stored credential.
    pub fn credential(&self) -> SessionCredential {
        self.store.get()
    }

    /// Latest prober snapshot; subscribes the calling component to changes.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.snapshot.read()
    }

    /// Latest warning view; subscribes the calling component to changes.
    pub fn warning(&self) -> WarningView {
        WarningView::from_snapshot(&self.snapshot())
    }

    /// Keeps the session alive from the warning modal.
    pub fn stay(&self) {
        self.warning.stay();
    }

    /// Ends the session in the background.
    pub fn logout_now(&self) {
        let warning = self.warning.clone();
        spawn(async move {
            warning.logout_now().await;
        });
    }

    /// Records a user interaction that the window listeners cannot see.
    pub fn record_activity(&self) {
        self.activity.record();
    }

    /// Signs in and stores the resulting credential.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<SessionCredential, ApiError> {
        let request = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let response = self.api.login(&request).await?;
        let credential = self.store.establish(&response);
        self.activity.record();
        tracing::trace!("Signed in with role {:?}", credential.role);
        Ok(credential)
    }

    /// Landing area for the stored role.
    pub fn landing_path(&self) -> String {
        self.config.landing_for(self.store.get().role).to_string()
    }
}

/// Provides the session context to the component tree.
///
/// Call once at the root of the application. The polling loop and activity
/// listeners live as long as the calling component.
///
/// # Example
///
/// ```ignore
/// #[component]
/// pub fn App() -> Element {
///     use_session_provider(SessionConfig::from_env_or_default());
///     rsx! {
///         SessionWarningModal {}
///         Router::<Route> {}
///     }
/// }
/// ```
pub fn use_session_provider(config: SessionConfig) -> SessionContext {
    let snapshot = use_signal(SessionSnapshot::default);
    let context = use_hook(move || SessionContext::new(config, snapshot));

    let listeners = use_hook({
        let activity = context.activity.clone();
        move || Rc::new(RefCell::new(ActivityListeners::attach(activity)))
    });

    use_future({
        let prober = context.prober.clone();
        move || {
            let prober = prober.clone();
            async move { prober.run().await }
        }
    });

    use_drop({
        let prober = context.prober.clone();
        move || {
            prober.dispose();
            listeners.borrow_mut().take();
        }
    });

    use_context_provider({
        let context = context.clone();
        move || context
    });
    context
}

/// Hook for accessing the session from any descendant of the provider.
///
/// # Panics
///
/// Panics if no ancestor called [`use_session_provider`].
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
}

/// Shared cell holding the most recent value of a `Copy` prop.
#[derive(Clone)]
struct Latest<T: Copy>(Rc<Cell<T>>);

impl<T: Copy> Latest<T> {
    fn new(value: T) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    fn set(&self, value: T) {
        self.0.set(value);
    }

    fn get(&self) -> T {
        self.0.get()
    }
}

/// Formats seconds as `m:ss` for the countdown.
pub fn countdown_label(remaining_seconds: u64) -> String {
    format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// Expiry warning modal, visible while the session is about to expire.
#[component]
pub fn SessionWarningModal() -> Element {
    let session = use_session();
    let view = session.warning();

    if !view.visible {
        return rsx! {};
    }

    let countdown = countdown_label(view.remaining_seconds);
    let stay = session.clone();
    let logout = session.clone();

    rsx! {
        div { class: "session-warning-backdrop",
            div { class: "session-warning",
                h2 { "Your session is about to expire" }
                p { "You will be signed out in {countdown}." }
                div { class: "session-warning-actions",
                    button { onclick: move |_| stay.stay(), "Stay signed in" }
                    button { onclick: move |_| logout.logout_now(), "Sign out" }
                }
            }
        }
    }
}

/// Renders `children` only when `access` allows the stored credential.
///
/// On a redirect decision nothing is rendered and `on_redirect` receives the
/// target path; the application's router performs the navigation.
#[component]
pub fn Guarded(access: Access, on_redirect: EventHandler<String>, children: Element) -> Element {
    let session = use_session();
    // Re-evaluate whenever the prober changes phase, e.g. after termination
    let _phase = session.snapshot().phase;

    let decision = authorize(&access, &session.credential(), session.config());
    let redirect = match &decision {
        GuardDecision::Redirect(path) => Some(path.clone()),
        GuardDecision::Allow => None,
    };

    // The effect only re-runs when the decision changes, so it reads the handler
    // from the latest render instead of capturing the first one
    let handler = use_hook(|| Latest::new(on_redirect));
    handler.set(on_redirect);

    use_effect(use_reactive((&redirect,), move |(redirect,)| {
        if let Some(path) = redirect {
            handler.get().call(path);
        }
    }));

    match decision {
        GuardDecision::Allow => rsx! {
            {children}
        },
        GuardDecision::Redirect(_) => rsx! {},
    }
}
