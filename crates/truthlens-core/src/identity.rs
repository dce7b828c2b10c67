//! Identity provider capability trait.
//!
//! Abstracts the hosted identity service (sign-up, sign-in, password
//! recovery, email verification) behind a trait so the application layer
//! can be tested against in-memory fakes.

use tokio::sync::broadcast;

use crate::error::Result;
use crate::profile::Profile;
use crate::session::{AuthEvent, Session, UserIdentity};

/// Metadata attached to the identity record at signup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignupMetadata {
    /// Display name chosen during signup.
    pub username: String,
}

/// Capability surface of the hosted identity service.
///
/// Profile reads and writes go through this trait as well: they hit a
/// row-level-secured table on the identity provider's managed database
/// directly, filtered by the caller's own identity. That is an
/// architectural shortcut inherited from the source system, not a
/// requirement of the design.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session, if one exists.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Returns the current user, if signed in.
    async fn current_user(&self) -> Result<Option<UserIdentity>>;

    /// Exchanges credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error on rejection; the session is returned even
    /// when the email is unconfirmed (the caller decides how to treat it).
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Registers a new account. A confirmation email is sent; no session
    /// is established until the address is verified.
    async fn sign_up(&self, email: &str, password: &str, metadata: SignupMetadata) -> Result<()>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Re-sends the signup confirmation email.
    async fn resend_signup_confirmation(&self, email: &str) -> Result<()>;

    /// Sends a password recovery email with a redirect back to the site.
    async fn send_password_reset_email(&self, email: &str) -> Result<()>;

    /// Replaces the password of the currently signed-in user.
    async fn update_password(&self, new_password: &str) -> Result<()>;

    /// Fetches the caller's profile row, if one exists.
    async fn fetch_profile(&self) -> Result<Option<Profile>>;

    /// Updates the caller's username.
    ///
    /// # Errors
    ///
    /// Uniqueness violations surface as `Auth` errors with
    /// [`crate::AuthErrorCode::DuplicateUsername`].
    async fn update_username(&self, username: &str) -> Result<()>;

    /// Subscribes to the auth event stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
