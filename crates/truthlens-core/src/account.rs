//! Account mutation gateway trait.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The updated avatar reference returned after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarRef {
    pub avatar_url: String,
}

/// Gateway to the first-party account mutation endpoints.
#[async_trait::async_trait]
pub trait AccountGateway: Send + Sync {
    /// Uploads a new avatar image as a multipart form.
    async fn upload_avatar(&self, bytes: Vec<u8>, filename: &str, mime: &str)
    -> Result<AvatarRef>;

    /// Deletes the caller's backend-owned data and then the identity record.
    async fn delete_account(&self) -> Result<()>;
}
