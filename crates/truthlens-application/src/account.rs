//! Account mutations: avatar upload, password change, account deletion.

use std::sync::Arc;

use truthlens_core::account::{AccountGateway, AvatarRef};
use truthlens_core::error::{Result, TruthlensError};
use truthlens_core::identity::IdentityProvider;
use truthlens_core::validation;

use crate::stores::ProfileStore;

/// Coordinates account mutations across the first-party backend and the
/// identity service, keeping the profile cache coherent afterwards.
pub struct AccountService {
    accounts: Arc<dyn AccountGateway>,
    identity: Arc<dyn IdentityProvider>,
    profile: Arc<ProfileStore>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountGateway>,
        identity: Arc<dyn IdentityProvider>,
        profile: Arc<ProfileStore>,
    ) -> Self {
        Self {
            accounts,
            identity,
            profile,
        }
    }

    /// Uploads a new avatar image and refreshes the cached profile so the
    /// new URL is visible before this resolves.
    pub async fn upload_avatar(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime: &str,
    ) -> Result<AvatarRef> {
        if bytes.is_empty() {
            return Err(TruthlensError::validation(
                "avatar",
                "Please select an image to upload",
            ));
        }
        if !mime.starts_with("image/") {
            return Err(TruthlensError::validation(
                "avatar",
                "Avatar must be an image file",
            ));
        }

        let avatar = self.accounts.upload_avatar(bytes, filename, mime).await?;
        self.profile.refresh().await?;
        tracing::info!(target: "truthlens::account", "avatar updated");
        Ok(avatar)
    }

    /// Changes the signed-in user's password after local validation.
    pub async fn change_password(&self, new_password: &str) -> Result<()> {
        validation::validate_password(new_password)?;
        self.identity.update_password(new_password).await
    }

    /// Deletes the account: backend data first, then the identity record's
    /// local session. The provider broadcasts the sign-out so navigation
    /// and store teardown follow.
    pub async fn delete_account(&self) -> Result<()> {
        self.accounts.delete_account().await?;
        self.identity.sign_out().await?;
        tracing::info!(target: "truthlens::account", "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::test_support::MockIdentityProvider;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockAccountGateway {
        uploads: AtomicUsize,
        deletions: AtomicUsize,
        last_upload: StdMutex<Option<(usize, String, String)>>,
    }

    impl MockAccountGateway {
        fn new() -> Self {
            Self {
                uploads: AtomicUsize::new(0),
                deletions: AtomicUsize::new(0),
                last_upload: StdMutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl AccountGateway for MockAccountGateway {
        async fn upload_avatar(
            &self,
            bytes: Vec<u8>,
            filename: &str,
            mime: &str,
        ) -> Result<AvatarRef> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            *self.last_upload.lock().unwrap() =
                Some((bytes.len(), filename.to_string(), mime.to_string()));
            Ok(AvatarRef {
                avatar_url: format!("https://cdn.example.com/avatars/{filename}"),
            })
        }

        async fn delete_account(&self) -> Result<()> {
            self.deletions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn service() -> (
        Arc<MockAccountGateway>,
        Arc<MockIdentityProvider>,
        AccountService,
    ) {
        let accounts = Arc::new(MockAccountGateway::new());
        let identity = Arc::new(MockIdentityProvider::new());
        identity.add_account("a@example.com", "Password1", true, "user_a");
        identity
            .sign_in_with_password("a@example.com", "Password1")
            .await
            .unwrap();
        let profile = Arc::new(ProfileStore::new(identity.clone()));
        let service = AccountService::new(accounts.clone(), identity.clone(), profile);
        (accounts, identity, service)
    }

    #[tokio::test]
    async fn test_upload_avatar_refreshes_profile() {
        let (accounts, identity, service) = service().await;

        let avatar = service
            .upload_avatar(vec![0xFF, 0xD8, 0xFF], "me.jpg", "image/jpeg")
            .await
            .unwrap();

        assert!(avatar.avatar_url.ends_with("me.jpg"));
        assert_eq!(accounts.uploads.load(Ordering::SeqCst), 1);
        // The cached profile was refetched after the mutation.
        assert_eq!(identity.profile_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_avatar_rejects_empty_and_non_image() {
        let (accounts, _identity, service) = service().await;

        let err = service
            .upload_avatar(Vec::new(), "me.jpg", "image/jpeg")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = service
            .upload_avatar(vec![1, 2, 3], "notes.txt", "text/plain")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(accounts.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_change_password_validates_locally() {
        let (_accounts, identity, service) = service().await;

        assert!(service.change_password("short").await.unwrap_err().is_validation());
        assert_eq!(identity.password_updates.load(Ordering::SeqCst), 0);

        service.change_password("NewPassword1").await.unwrap();
        assert_eq!(identity.password_updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_account_signs_out() {
        let (accounts, identity, service) = service().await;

        service.delete_account().await.unwrap();

        assert_eq!(accounts.deletions.load(Ordering::SeqCst), 1);
        assert!(identity.current_session().await.unwrap().is_none());
    }
}
