//! Profile domain model.

use serde::{Deserialize, Serialize};

/// The user-editable profile attached to an account.
///
/// One per authenticated user, fetched lazily and cached under the
/// profile store keyed implicitly by the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name, unique across accounts
    pub username: String,
    /// Reference to the uploaded avatar, if any
    #[serde(default)]
    pub avatar_url: Option<String>,
}
