//! Data stores built on the single-flight cache.
//!
//! Each store pairs a [`crate::RequestCache`] with the capability trait it
//! fetches through. The caches hold session-scoped data, so the whole
//! collection is torn down when the session ends: a later sign-in by a
//! different user must never observe a prior user's cached profile or
//! history.
//!
//! # Module Structure
//!
//! - `session_store`: current session + credential operations
//! - `profile_store`: username/avatar profile
//! - `history_store`: analysis history

mod history_store;
mod profile_store;
mod session_store;

// Re-export public API
pub use history_store::HistoryStore;
pub use profile_store::ProfileStore;
pub use session_store::SessionStore;

use std::sync::Arc;

use truthlens_core::article::ArticleGateway;
use truthlens_core::error::Result;
use truthlens_core::identity::IdentityProvider;

/// The shared store collection for one client instance.
///
/// Passed explicitly to consumers instead of living in module-level
/// statics, so tests get isolated instances and cross-consumer coupling
/// stays visible.
pub struct Stores {
    pub session: Arc<SessionStore>,
    pub profile: Arc<ProfileStore>,
    pub history: Arc<HistoryStore>,
}

impl Stores {
    /// Creates the store collection over the given capability
    /// implementations.
    pub fn new(identity: Arc<dyn IdentityProvider>, articles: Arc<dyn ArticleGateway>) -> Self {
        Self {
            session: Arc::new(SessionStore::new(Arc::clone(&identity))),
            profile: Arc::new(ProfileStore::new(identity)),
            history: Arc::new(HistoryStore::new(articles)),
        }
    }

    /// Signs the user out and tears down every cache.
    pub async fn sign_out(&self) -> Result<()> {
        self.session.logout().await?;
        self.reset_caches().await;
        Ok(())
    }

    /// Resets all caches to their empty state without calling the
    /// provider. Invoked on every `SignedOut` event so session-scoped data
    /// cannot leak across a sign-out/sign-in boundary.
    pub async fn reset_caches(&self) {
        self.session.reset().await;
        self.profile.reset().await;
        self.history.reset().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::broadcast;

    use truthlens_core::article::{AnalyzedArticle, ArticleGateway, HistoryEntry};
    use truthlens_core::error::{AuthErrorCode, Result, TruthlensError};
    use truthlens_core::identity::{IdentityProvider, SignupMetadata};
    use truthlens_core::profile::Profile;
    use truthlens_core::session::{AuthEvent, Session, UserIdentity};

    /// In-memory identity provider with per-operation call counters.
    pub struct MockIdentityProvider {
        session: Mutex<Option<Session>>,
        /// Accounts keyed by email: (password, confirmed, username)
        accounts: Mutex<HashMap<String, (String, bool, String)>>,
        profiles: Mutex<HashMap<String, Profile>>,
        pub profile_fetches: AtomicUsize,
        pub sign_in_calls: AtomicUsize,
        pub resend_calls: AtomicUsize,
        pub recover_calls: AtomicUsize,
        pub password_updates: AtomicUsize,
        events: broadcast::Sender<AuthEvent>,
    }

    impl MockIdentityProvider {
        pub fn new() -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                session: Mutex::new(None),
                accounts: Mutex::new(HashMap::new()),
                profiles: Mutex::new(HashMap::new()),
                profile_fetches: AtomicUsize::new(0),
                sign_in_calls: AtomicUsize::new(0),
                resend_calls: AtomicUsize::new(0),
                recover_calls: AtomicUsize::new(0),
                password_updates: AtomicUsize::new(0),
                events,
            }
        }

        pub fn add_account(&self, email: &str, password: &str, confirmed: bool, username: &str) {
            self.accounts.lock().unwrap().insert(
                email.to_string(),
                (password.to_string(), confirmed, username.to_string()),
            );
            self.profiles.lock().unwrap().insert(
                email.to_string(),
                Profile {
                    username: username.to_string(),
                    avatar_url: None,
                },
            );
        }

        pub fn publish(&self, event: AuthEvent) {
            let _ = self.events.send(event);
        }

        fn session_for(email: &str, confirmed: bool) -> Session {
            Session {
                access_token: format!("token-{email}"),
                user: UserIdentity {
                    id: format!("user-{email}"),
                    email: email.to_string(),
                    email_confirmed_at: confirmed.then(chrono::Utc::now),
                    metadata: HashMap::new(),
                },
            }
        }
    }

    #[async_trait::async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn current_session(&self) -> Result<Option<Session>> {
            Ok(self.session.lock().unwrap().clone())
        }

        async fn current_user(&self) -> Result<Option<UserIdentity>> {
            Ok(self.session.lock().unwrap().as_ref().map(|s| s.user.clone()))
        }

        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
            self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some((stored, confirmed, _)) if stored == password => {
                    let session = Self::session_for(email, *confirmed);
                    *self.session.lock().unwrap() = Some(session.clone());
                    self.publish(AuthEvent::SignedIn {
                        session: session.clone(),
                    });
                    Ok(session)
                }
                _ => Err(TruthlensError::auth(
                    AuthErrorCode::InvalidCredentials,
                    "Invalid login credentials",
                )),
            }
        }

        async fn sign_up(
            &self,
            email: &str,
            password: &str,
            metadata: SignupMetadata,
        ) -> Result<()> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(TruthlensError::auth(
                    AuthErrorCode::AlreadyRegistered,
                    "User already registered",
                ));
            }
            accounts.insert(
                email.to_string(),
                (password.to_string(), false, metadata.username),
            );
            Ok(())
        }

        async fn sign_out(&self) -> Result<()> {
            *self.session.lock().unwrap() = None;
            self.publish(AuthEvent::SignedOut);
            Ok(())
        }

        async fn resend_signup_confirmation(&self, _email: &str) -> Result<()> {
            self.resend_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_password_reset_email(&self, _email: &str) -> Result<()> {
            self.recover_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn update_password(&self, _new_password: &str) -> Result<()> {
            self.password_updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_profile(&self) -> Result<Option<Profile>> {
            self.profile_fetches.fetch_add(1, Ordering::SeqCst);
            let email = match self.session.lock().unwrap().as_ref() {
                Some(session) => session.user.email.clone(),
                None => return Ok(None),
            };
            Ok(self.profiles.lock().unwrap().get(&email).cloned())
        }

        async fn update_username(&self, username: &str) -> Result<()> {
            let taken = self
                .profiles
                .lock()
                .unwrap()
                .values()
                .any(|p| p.username == username);
            if taken {
                return Err(TruthlensError::auth_from_message(
                    "duplicate key value violates unique constraint \"profiles_username_key\"",
                ));
            }
            let email = self
                .session
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| s.user.email.clone())
                .ok_or_else(|| TruthlensError::internal("not signed in"))?;
            if let Some(profile) = self.profiles.lock().unwrap().get_mut(&email) {
                profile.username = username.to_string();
            }
            Ok(())
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    /// In-memory article gateway with a call counter per endpoint.
    pub struct MockArticleGateway {
        pub entries: Mutex<Vec<HistoryEntry>>,
        pub history_calls: AtomicUsize,
        pub clear_calls: AtomicUsize,
        pub detail_calls: AtomicUsize,
    }

    impl MockArticleGateway {
        pub fn new(entries: Vec<HistoryEntry>) -> Self {
            Self {
                entries: Mutex::new(entries),
                history_calls: AtomicUsize::new(0),
                clear_calls: AtomicUsize::new(0),
                detail_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ArticleGateway for MockArticleGateway {
        async fn analyze(&self, _url: &str) -> Result<AnalyzedArticle> {
            Err(TruthlensError::internal("not used in store tests"))
        }

        async fn history(&self) -> Result<Vec<HistoryEntry>> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn clear_history(&self) -> Result<()> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().clear();
            Ok(())
        }

        async fn article(&self, id: &str) -> Result<AnalyzedArticle> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.article.id == id)
                .map(|e| AnalyzedArticle {
                    article: e.article.clone(),
                    analysis: e.analysis.clone(),
                })
                .ok_or_else(|| TruthlensError::not_found("article", id))
        }
    }

    /// Builds a history entry for tests.
    pub fn history_entry(id: &str, url: &str) -> HistoryEntry {
        use truthlens_core::article::{Analysis, Article};
        HistoryEntry {
            created_at: chrono::Utc::now(),
            article: Article {
                id: id.to_string(),
                url: url.to_string(),
                title: format!("Article {id}"),
                source: Some("Example News".to_string()),
                collected_date: None,
            },
            analysis: Analysis {
                label: "RELIABLE".to_string(),
                score: 0.9,
                genre: None,
                related: Vec::new(),
                is_satire: false,
            },
        }
    }
}
