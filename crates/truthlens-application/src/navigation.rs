//! Auth-driven navigation state machine.
//!
//! Interprets identity events together with the current URL and decides
//! which route to show. The "never redirect away from the static verify
//! and reset pages" rule is a structural guard evaluated before anything
//! else, not a condition scattered across call sites.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use truthlens_core::route::{FragmentToken, Route};
use truthlens_core::session::AuthEvent;

use crate::stores::Stores;

/// Where the auth flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlowState {
    Anonymous,
    Authenticated,
    PendingEmailVerification,
    PendingPasswordReset,
}

/// The browser-side location an event was observed at.
#[derive(Debug, Clone)]
pub struct Location {
    /// Resolved route for the current path, if it matches one.
    pub route: Option<Route>,
    /// Hash portion of the URL, possibly carrying a provider token.
    pub fragment: String,
}

impl Location {
    pub fn new(route: Option<Route>, fragment: impl Into<String>) -> Self {
        Self {
            route,
            fragment: fragment.into(),
        }
    }
}

/// Host-side navigation surface the controller issues redirects through.
pub trait Navigator: Send + Sync {
    /// The location at the time of the event.
    fn current_location(&self) -> Location;
    /// Performs the redirect.
    fn navigate(&self, route: Route);
}

/// State machine over the auth event stream crossed with the URL.
pub struct NavigationController {
    state: AuthFlowState,
    /// Set when a recovery token was seen; guards rule 4 below.
    recovery_in_progress: bool,
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            state: AuthFlowState::Anonymous,
            recovery_in_progress: false,
        }
    }

    pub fn state(&self) -> AuthFlowState {
        self.state
    }

    /// Applies one event and returns the redirect to perform, if any.
    ///
    /// Rules, in priority order:
    /// 1. On the static verify/reset pages: never redirect away.
    /// 2. Signup-confirmation fragment token: go to the verify page.
    /// 3. Recovery fragment token: go to the reset page.
    /// 4. `SignedIn`: go to the dashboard, unless the event fired on the
    ///    login page while a recovery flow is in progress. That guard is a
    ///    heuristic inherited from the source system (pathname + recovery
    ///    flag); when a stale session and a recovery token coexist, the
    ///    token wins because rules 2-3 run first.
    /// 5. Otherwise: anonymous, go to the login page.
    pub fn observe(&mut self, event: &AuthEvent, location: &Location) -> Option<Route> {
        if let Some(route) = location.route
            && route.is_static_auth_page()
        {
            return None;
        }

        match FragmentToken::parse(&location.fragment) {
            Some(FragmentToken::SignupConfirmation) => {
                self.state = AuthFlowState::PendingEmailVerification;
                return Some(Route::VerifyEmail);
            }
            Some(FragmentToken::Recovery) => {
                self.state = AuthFlowState::PendingPasswordReset;
                self.recovery_in_progress = true;
                return Some(Route::ResetPassword);
            }
            None => {}
        }

        match event {
            AuthEvent::SignedIn { .. } => {
                if location.route == Some(Route::Login) && self.recovery_in_progress {
                    return None;
                }
                self.state = AuthFlowState::Authenticated;
                Some(Route::Dashboard)
            }
            AuthEvent::SignedOut => {
                self.state = AuthFlowState::Anonymous;
                self.recovery_in_progress = false;
                Some(Route::Login)
            }
        }
    }

    /// Marks the recovery flow finished (password saved), re-enabling the
    /// normal sign-in redirect.
    pub fn complete_recovery(&mut self) {
        self.recovery_in_progress = false;
        if self.state == AuthFlowState::PendingPasswordReset {
            self.state = AuthFlowState::Anonymous;
        }
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the provider's event stream, applying teardown and redirects.
///
/// Runs until the provider drops its event channel. Store teardown happens
/// here, on the event path, so session-scoped caches are cleared no matter
/// which call site triggered the sign-out.
pub async fn run_event_pump(
    controller: Arc<Mutex<NavigationController>>,
    mut events: broadcast::Receiver<AuthEvent>,
    navigator: Arc<dyn Navigator>,
    stores: Arc<Stores>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if matches!(event, AuthEvent::SignedOut) {
                    stores.reset_caches().await;
                }
                let location = navigator.current_location();
                let redirect = controller.lock().await.observe(&event, &location);
                if let Some(route) = redirect {
                    tracing::debug!(target: "truthlens::nav", ?route, "redirecting");
                    navigator.navigate(route);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(target: "truthlens::nav", skipped, "auth event stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
