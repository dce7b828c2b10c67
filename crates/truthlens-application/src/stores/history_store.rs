//! Analysis history store.

use std::sync::Arc;

use truthlens_core::article::{AnalyzedArticle, ArticleGateway, HistoryEntry};
use truthlens_core::error::Result;

use crate::cache::RequestCache;

/// Caches the caller's server-owned analysis history.
///
/// The list is read-mostly; it is refreshed after a successful submission
/// and cleared only through the explicit destructive `clear_all`.
pub struct HistoryStore {
    articles: Arc<dyn ArticleGateway>,
    cache: RequestCache<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new(articles: Arc<dyn ArticleGateway>) -> Self {
        Self {
            articles,
            cache: RequestCache::new(Vec::new()),
        }
    }

    /// The cached history, fetched on first access.
    pub async fn current(&self) -> Result<Vec<HistoryEntry>> {
        let articles = Arc::clone(&self.articles);
        self.cache
            .get(move || async move { articles.history().await })
            .await
    }

    /// Discards the cache and refetches; used after a new analysis.
    pub async fn refresh(&self) -> Result<Vec<HistoryEntry>> {
        self.cache.reset(Vec::new()).await;
        self.current().await
    }

    /// Deletes the entire history on the backend.
    ///
    /// Destructive; callers are expected to have confirmed with the user.
    /// On success the cache is primed empty, since the result is known.
    pub async fn clear_all(&self) -> Result<()> {
        self.articles.clear_history().await?;
        self.cache.prime(Vec::new()).await;
        Ok(())
    }

    /// Fetches one analyzed article's detail. Not cached; the detail view
    /// is transient.
    pub async fn detail(&self, id: &str) -> Result<AnalyzedArticle> {
        self.articles.article(id).await
    }

    pub async fn reset(&self) {
        self.cache.reset(Vec::new()).await;
    }

    pub async fn is_initialized(&self) -> bool {
        self.cache.is_initialized().await
    }

    pub async fn peek(&self) -> Vec<HistoryEntry> {
        self.cache.peek().await
    }
}
