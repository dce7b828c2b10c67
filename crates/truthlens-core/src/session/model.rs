//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The identity-provider record for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Unique user identifier (UUID format)
    pub id: String,
    /// Registered email address
    pub email: String,
    /// When the email address was confirmed, if it has been
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Arbitrary provider-side metadata recorded at signup (e.g. username)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl UserIdentity {
    /// True once the user has followed the confirmation link.
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// A provider-issued credential plus the user it belongs to.
///
/// At most one logical session exists per client instance; it is created on
/// sign-in/sign-up/token-refresh and destroyed on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent to the first-party API
    pub access_token: String,
    /// The authenticated user
    pub user: UserIdentity,
}

impl Session {
    /// True when the session belongs to a confirmed account.
    pub fn is_confirmed(&self) -> bool {
        self.user.is_confirmed()
    }
}
