//! HTTP identity provider.
//!
//! Talks to the hosted identity service (token grant, signup, recovery,
//! verification resend) and to its row-level-secured profile table. Session
//! changes are broadcast as [`AuthEvent`]s so navigation and store teardown
//! can react without being on the mutation call path.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use truthlens_core::config::AppConfig;
use truthlens_core::error::{AuthErrorCode, Result, TruthlensError};
use truthlens_core::identity::{IdentityProvider, SignupMetadata};
use truthlens_core::profile::Profile;
use truthlens_core::session::{AuthEvent, Session, UserIdentity};

use crate::status;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Client for a GoTrue/PostgREST-style hosted identity service.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    public_key: String,
    redirect_url: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

/// Successful token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserRecord,
}

/// Provider-side user record.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    #[serde(default)]
    email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user_metadata: HashMap<String, Value>,
}

impl From<UserRecord> for UserIdentity {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            email_confirmed_at: record.email_confirmed_at,
            metadata: record.user_metadata,
        }
    }
}

/// Extracts the provider's error message and classifies it.
///
/// The service answers with `error_description`, `msg`, or `message`
/// depending on the endpoint.
fn provider_error(status: u16, body: &str) -> TruthlensError {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str)
                && !text.is_empty()
            {
                return TruthlensError::auth_from_message(text);
            }
        }
    }
    TruthlensError::auth(
        AuthErrorCode::Unknown,
        format!("Authentication failed ({status})"),
    )
}

impl HttpIdentityProvider {
    /// Creates a provider from client configuration.
    pub fn new(config: &AppConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client: Client::new(),
            base_url: config.identity_url.trim_end_matches('/').to_string(),
            public_key: config.identity_public_key.clone(),
            redirect_url: config.redirect_url(),
            session: RwLock::new(None),
            events,
        }
    }

    fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn table_endpoint(&self, path: &str) -> String {
        format!("{}/rest/v1{}", self.base_url, path)
    }

    /// The session required by profile and password operations.
    async fn require_session(&self) -> Result<Session> {
        self.session.read().await.clone().ok_or_else(|| {
            TruthlensError::auth(
                AuthErrorCode::Unknown,
                "You need to be logged in to perform this action.",
            )
        })
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(status.as_u16(), &body));
        }
        Ok(response)
    }

    fn publish(&self, event: AuthEvent) {
        // Receivers may not exist yet; a send error only means nobody is
        // listening, which is fine during startup.
        let _ = self.events.send(event);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn current_user(&self) -> Result<Option<UserIdentity>> {
        Ok(self.session.read().await.as_ref().map(|s| s.user.clone()))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.auth_endpoint("/token?grant_type=password"))
            .header("apikey", &self.public_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        let response = self.check(response).await?;

        let token: TokenResponse = response.json().await.map_err(|e| {
            TruthlensError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse token response: {e}"),
            }
        })?;

        let session = Session {
            access_token: token.access_token,
            user: token.user.into(),
        };
        *self.session.write().await = Some(session.clone());
        tracing::info!(target: "truthlens::identity", user_id = %session.user.id, "signed in");
        self.publish(AuthEvent::SignedIn {
            session: session.clone(),
        });
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: SignupMetadata) -> Result<()> {
        let response = self
            .client
            .post(self.auth_endpoint("/signup"))
            .query(&[("redirect_to", self.redirect_url.as_str())])
            .header("apikey", &self.public_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "username": metadata.username },
            }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        self.check(response).await?;
        tracing::info!(target: "truthlens::identity", "signup accepted, confirmation pending");
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            let response = self
                .client
                .post(self.auth_endpoint("/logout"))
                .header("apikey", &self.public_key)
                .header("Authorization", format!("Bearer {}", session.access_token))
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;
            // Local sign-out wins even if the revocation call failed; the
            // token simply expires server-side.
            if let Err(e) = response {
                tracing::warn!(target: "truthlens::identity", "logout revocation failed: {e}");
            }
        }
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    async fn resend_signup_confirmation(&self, email: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_endpoint("/resend"))
            .header("apikey", &self.public_key)
            .json(&serde_json::json!({ "type": "signup", "email": email }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        self.check(response).await?;
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_endpoint("/recover"))
            .query(&[("redirect_to", self.redirect_url.as_str())])
            .header("apikey", &self.public_key)
            .json(&serde_json::json!({ "email": email }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        self.check(response).await?;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<()> {
        let session = self.require_session().await?;
        let response = self
            .client
            .put(self.auth_endpoint("/user"))
            .header("apikey", &self.public_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .json(&serde_json::json!({ "password": new_password }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        self.check(response).await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<Option<Profile>> {
        let session = self.require_session().await?;
        let response = self
            .client
            .get(self.table_endpoint("/profiles"))
            .query(&[
                ("select", "username,avatar_url"),
                ("id", &format!("eq.{}", session.user.id)),
            ])
            .header("apikey", &self.public_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        let response = self.check(response).await?;

        let mut rows: Vec<Profile> = response.json().await.map_err(|e| {
            TruthlensError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse profile row: {e}"),
            }
        })?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn update_username(&self, username: &str) -> Result<()> {
        let session = self.require_session().await?;
        let response = self
            .client
            .patch(self.table_endpoint("/profiles"))
            .query(&[("id", format!("eq.{}", session.user.id))])
            .header("apikey", &self.public_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .json(&serde_json::json!({ "username": username }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| status::network_error(&e))?;
        self.check(response).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
