//! Route authorization guards.
//!
//! Guards are plain values: an [`Access`] requirement is checked against the
//! current [`SessionCredential`] on every navigation and yields a
//! [`GuardDecision`]. Requirements compose with [`Access::and`], so a view that
//! needs "authenticated and not admin" is written once, not as a bespoke guard.
//!
//! # Example
//!
//! ```
//! # use dxsession::{Role, SessionConfig, SessionCredential};
//! # use dxsession::client::guards::{Access, GuardDecision, authorize};
//! let config = SessionConfig::default();
//! let admin = SessionCredential::new(Some("token".to_string()), Some(Role::Admin));
//!
//! let decision = authorize(&Access::user_only(), &admin, &config);
//! assert_eq!(decision, GuardDecision::Redirect("/admin".to_string()));
//! ```

use crate::{Role, SessionConfig, SessionCredential};

/// Access requirement of a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Anyone may enter
    Public,
    /// A token is required
    Authenticated,
    /// The credential must carry this role
    Role(Role),
    /// The credential must not carry this role
    NotRole(Role),
    /// Every requirement must hold; checked in order
    All(Vec<Access>),
}

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigate to this path instead
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

impl Access {
    /// Combines two requirements.
    pub fn and(self, other: Access) -> Access {
        match (self, other) {
            (Access::Public, other) | (other, Access::Public) => other,
            (Access::All(mut first), Access::All(second)) => {
                first.extend(second);
                Access::All(first)
            }
            (Access::All(mut first), other) => {
                first.push(other);
                Access::All(first)
            }
            (first, other) => Access::All(vec![first, other]),
        }
    }

    /// The regular user area: authenticated and not an administrator.
    pub fn user_only() -> Access {
        Access::Authenticated.and(Access::NotRole(Role::Admin))
    }

    /// The admin area: authenticated administrators only.
    pub fn admin_only() -> Access {
        Access::Authenticated.and(Access::Role(Role::Admin))
    }

    /// Checks this requirement against a credential.
    pub fn check(&self, credential: &SessionCredential, config: &SessionConfig) -> GuardDecision {
        match self {
            Access::Public => GuardDecision::Allow,
            Access::Authenticated => {
                if credential.is_authenticated() {
                    GuardDecision::Allow
                } else {
                    GuardDecision::Redirect(config.login_path.clone())
                }
            }
            Access::Role(required) => match credential.role {
                _ if !credential.is_authenticated() => {
                    GuardDecision::Redirect(config.login_path.clone())
                }
                Some(role) if role == *required => GuardDecision::Allow,
                Some(role) => GuardDecision::Redirect(config.landing_for(Some(role)).to_string()),
                // A token without a usable role cannot enter role-gated views
                None => GuardDecision::Redirect(config.login_path.clone()),
            },
            Access::NotRole(excluded) => match credential.role {
                Some(role) if role == *excluded => {
                    GuardDecision::Redirect(config.landing_for(Some(role)).to_string())
                }
                _ => GuardDecision::Allow,
            },
            Access::All(requirements) => requirements
                .iter()
                .map(|requirement| requirement.check(credential, config))
                .find(|decision| !decision.is_allowed())
                .unwrap_or(GuardDecision::Allow),
        }
    }
}

/// Checks `access` against `credential`.
pub fn authorize(
    access: &Access,
    credential: &SessionCredential,
    config: &SessionConfig,
) -> GuardDecision {
    let decision = access.check(credential, config);
    if let GuardDecision::Redirect(path) = &decision {
        tracing::trace!("Guard {:?} redirects to {}", access, path);
    }
    decision
}

/// Decision for the site root.
///
/// Anonymous visitors see the public landing view; signed-in users go to
/// their role's area.
pub fn root_decision(credential: &SessionCredential, config: &SessionConfig) -> GuardDecision {
    if credential.is_authenticated() {
        GuardDecision::Redirect(config.landing_for(credential.role).to_string())
    } else {
        GuardDecision::Allow
    }
}

static PUBLIC: Access = Access::Public;

/// Ordered path-prefix rules; the first match wins, unmatched paths are public.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<(String, Access)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protects `prefix` and everything below it.
    pub fn protect(mut self, prefix: impl Into<String>, access: Access) -> Self {
        let prefix = prefix.into();
        let prefix = match prefix.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        self.rules.push((prefix, access));
        self
    }

    /// The application's routes: the user area under `/main` and `/history`,
    /// the admin area under `/admin`.
    pub fn standard() -> Self {
        Self::new()
            .protect("/main", Access::user_only())
            .protect("/history", Access::user_only())
            .protect("/admin", Access::admin_only())
    }

    /// Requirement for `path`.
    pub fn access_for(&self, path: &str) -> &Access {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.rules
            .iter()
            .find(|(prefix, _)| matches_prefix(path, prefix))
            .map(|(_, access)| access)
            .unwrap_or(&PUBLIC)
    }

    /// Decision for navigating to `path`.
    pub fn decide(
        &self,
        path: &str,
        credential: &SessionCredential,
        config: &SessionConfig,
    ) -> GuardDecision {
        if path == "/" {
            return root_decision(credential, config);
        }
        authorize(self.access_for(path), credential, config)
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
