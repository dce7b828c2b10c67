use serde::{Deserialize, Serialize};

use super::Session;

/// Auth events broadcast by the identity provider.
///
/// Consumers (navigation, store teardown) receive these over a
/// `tokio::sync::broadcast` channel, independently of any call site that
/// triggered the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A session was established (sign-in, sign-up auto-login, or refresh).
    SignedIn { session: Session },
    /// The session ended.
    SignedOut,
}

impl AuthEvent {
    /// The session carried by a `SignedIn` event.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn { session } => Some(session),
            Self::SignedOut => None,
        }
    }
}
