//! Session store: current session plus credential operations.

use std::sync::Arc;

use tokio::sync::RwLock;

use truthlens_core::error::{Result, TruthlensError};
use truthlens_core::identity::{IdentityProvider, SignupMetadata};
use truthlens_core::session::Session;
use truthlens_core::validation;

use crate::cache::RequestCache;

/// Wraps the identity provider's session behind the single-flight cache
/// and exposes the credential mutations.
///
/// Every mutation validates its inputs locally before any network call and
/// fails fast with a field-specific error.
pub struct SessionStore {
    identity: Arc<dyn IdentityProvider>,
    cache: RequestCache<Option<Session>>,
    /// Email awaiting confirmation after a signup or an unconfirmed login.
    /// Held only in memory; cleared on successful login or explicitly.
    pending_verification: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            cache: RequestCache::new(None),
            pending_verification: RwLock::new(None),
        }
    }

    /// The current session, fetched from the provider on first access.
    pub async fn current(&self) -> Result<Option<Session>> {
        let identity = Arc::clone(&self.identity);
        self.cache
            .get(move || async move { identity.current_session().await })
            .await
    }

    /// Signs in with email and password.
    ///
    /// A provider-accepted login whose email is still unconfirmed is
    /// treated as a failure requiring verification, not as a success: the
    /// credential is discarded and the email is recorded as pending.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() {
            return Err(TruthlensError::validation(
                "email",
                "Email is required to log in",
            ));
        }
        if password.is_empty() {
            return Err(TruthlensError::validation(
                "password",
                "Password is required to log in",
            ));
        }
        validation::validate_email(email)?;

        let session = self.identity.sign_in_with_password(email, password).await?;

        if !session.is_confirmed() {
            *self.pending_verification.write().await = Some(email.to_string());
            self.identity.sign_out().await?;
            return Err(TruthlensError::auth(
                truthlens_core::AuthErrorCode::EmailNotConfirmed,
                "Please verify your email address before logging in",
            ));
        }

        self.cache.prime(Some(session.clone())).await;
        *self.pending_verification.write().await = None;
        Ok(session)
    }

    /// Registers a new account. On success the email is recorded as
    /// pending verification; no session exists until the link is followed.
    pub async fn signup(&self, email: &str, password: &str, username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(TruthlensError::validation(
                "username",
                "Username is required for signup",
            ));
        }
        if email.trim().is_empty() {
            return Err(TruthlensError::validation(
                "email",
                "Email is required for signup",
            ));
        }
        if password.is_empty() {
            return Err(TruthlensError::validation(
                "password",
                "Password is required for signup",
            ));
        }
        validation::validate_username(username)?;
        validation::validate_email(email)?;
        validation::validate_password(password)?;

        self.identity
            .sign_up(
                email,
                password,
                SignupMetadata {
                    username: username.to_string(),
                },
            )
            .await?;

        *self.pending_verification.write().await = Some(email.to_string());
        Ok(())
    }

    /// Ends the session and clears the cached credential.
    pub async fn logout(&self) -> Result<()> {
        self.identity.sign_out().await?;
        self.reset().await;
        Ok(())
    }

    /// Re-sends the signup confirmation email.
    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        validation::validate_email(email)?;
        self.identity.resend_signup_confirmation(email).await
    }

    /// Sends a password recovery email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        validation::validate_email(email)?;
        self.identity.send_password_reset_email(email).await
    }

    /// Replaces the signed-in user's password.
    pub async fn update_password(&self, new_password: &str) -> Result<()> {
        validation::validate_password(new_password)?;
        self.identity.update_password(new_password).await
    }

    /// The email awaiting confirmation, if any.
    pub async fn pending_verification(&self) -> Option<String> {
        self.pending_verification.read().await.clone()
    }

    /// Forgets the pending-verification marker (navigation away).
    pub async fn clear_pending_verification(&self) {
        *self.pending_verification.write().await = None;
    }

    /// Clears the cached session and the pending marker.
    pub async fn reset(&self) {
        self.cache.reset(None).await;
        *self.pending_verification.write().await = None;
    }

    pub async fn is_initialized(&self) -> bool {
        self.cache.is_initialized().await
    }

    pub async fn peek(&self) -> Option<Session> {
        self.cache.peek().await
    }
}
