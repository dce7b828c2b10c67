//! Profile store.

use std::sync::Arc;

use truthlens_core::error::{Result, TruthlensError};
use truthlens_core::identity::IdentityProvider;
use truthlens_core::profile::Profile;
use truthlens_core::validation;

use crate::cache::RequestCache;

/// Caches the signed-in user's profile and handles username edits.
///
/// The cache is keyed implicitly by "current session": store teardown on
/// sign-out guarantees no profile survives a user switch.
pub struct ProfileStore {
    identity: Arc<dyn IdentityProvider>,
    cache: RequestCache<Option<Profile>>,
}

impl ProfileStore {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            cache: RequestCache::new(None),
        }
    }

    /// The cached profile, fetched lazily on first access.
    pub async fn current(&self) -> Result<Option<Profile>> {
        let identity = Arc::clone(&self.identity);
        self.cache
            .get(move || async move { identity.fetch_profile().await })
            .await
    }

    /// Discards the cache and refetches; used after mutations.
    pub async fn refresh(&self) -> Result<Option<Profile>> {
        self.cache.reset(None).await;
        self.current().await
    }

    /// Updates the username after local validation.
    ///
    /// Saving the current username again is a no-op that skips the
    /// network. Uniqueness violations surface with the fixed user message
    /// "Username is already taken".
    pub async fn update_username(&self, username: &str) -> Result<()> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(TruthlensError::validation(
                "username",
                "Username cannot be empty",
            ));
        }
        validation::validate_username(trimmed)?;

        if let Some(profile) = self.cache.peek().await
            && profile.username == trimmed
        {
            return Ok(());
        }

        self.identity.update_username(trimmed).await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn reset(&self) {
        self.cache.reset(None).await;
    }

    pub async fn is_initialized(&self) -> bool {
        self.cache.is_initialized().await
    }

    pub async fn peek(&self) -> Option<Profile> {
        self.cache.peek().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::test_support::MockIdentityProvider;
    use std::sync::atomic::Ordering;

    async fn signed_in_store() -> (Arc<MockIdentityProvider>, ProfileStore) {
        let identity = Arc::new(MockIdentityProvider::new());
        identity.add_account("a@example.com", "Password1", true, "user_a");
        identity
            .sign_in_with_password("a@example.com", "Password1")
            .await
            .unwrap();
        let store = ProfileStore::new(identity.clone());
        (identity, store)
    }

    #[tokio::test]
    async fn test_current_fetches_once() {
        let (identity, store) = signed_in_store().await;

        let first = store.current().await.unwrap().unwrap();
        let second = store.current().await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(identity.profile_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let (identity, store) = signed_in_store().await;

        store.current().await.unwrap();
        store.refresh().await.unwrap();
        assert_eq!(identity.profile_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_update_username_refreshes_profile() {
        let (_identity, store) = signed_in_store().await;

        store.current().await.unwrap();
        store.update_username("fresh_name").await.unwrap();
        let profile = store.current().await.unwrap().unwrap();
        assert_eq!(profile.username, "fresh_name");
    }

    #[tokio::test]
    async fn test_update_username_validates_locally() {
        let (_identity, store) = signed_in_store().await;

        assert!(store.update_username("  ").await.unwrap_err().is_validation());
        assert!(store.update_username("ab").await.unwrap_err().is_validation());
        assert!(store.update_username("bad name!").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_update_username_noop_for_same_name() {
        let (identity, store) = signed_in_store().await;

        store.current().await.unwrap();
        store.update_username("user_a").await.unwrap();
        // Cached profile matched, so nothing was refetched.
        assert_eq!(identity.profile_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_surfaces_exact_message() {
        let identity = Arc::new(MockIdentityProvider::new());
        identity.add_account("a@example.com", "Password1", true, "user_a");
        identity.add_account("b@example.com", "Password2", true, "user_b");
        identity
            .sign_in_with_password("a@example.com", "Password1")
            .await
            .unwrap();
        let store = ProfileStore::new(identity);

        let err = store.update_username("user_b").await.unwrap_err();
        assert_eq!(err.user_message(), "Username is already taken");
    }
}
