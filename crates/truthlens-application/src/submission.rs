//! Article submission workflow.
//!
//! Validates and submits a URL for analysis. A successful submission never
//! resolves before a configured minimum display duration so the client's
//! progress animation can play out; the remainder is slept, not polled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use truthlens_core::article::{AnalyzedArticle, ArticleGateway, HistoryEntry};
use truthlens_core::error::{Result, TruthlensError};
use truthlens_core::validation;

/// Default minimum wall-clock duration of a successful submission.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_secs(8);

/// Tunables for the submission workflow.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// Minimum elapsed time before a successful submission resolves.
    /// A UX contract for the progress animation, not a correctness one.
    pub min_display: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            min_display: DEFAULT_MIN_DISPLAY,
        }
    }
}

/// Callback invoked after a successful submission (typically a history
/// refresh, spawned by the caller).
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Guards and executes article submissions.
///
/// The entry point is gated by a loading flag: a second submission while
/// one is running fails with `Busy` instead of queueing.
pub struct SubmissionController {
    articles: Arc<dyn ArticleGateway>,
    config: SubmissionConfig,
    input: RwLock<String>,
    loading: AtomicBool,
    on_complete: RwLock<Option<CompletionCallback>>,
}

impl SubmissionController {
    pub fn new(articles: Arc<dyn ArticleGateway>, config: SubmissionConfig) -> Self {
        Self {
            articles,
            config,
            input: RwLock::new(String::new()),
            loading: AtomicBool::new(false),
            on_complete: RwLock::new(None),
        }
    }

    /// Registers the callback run after each successful submission.
    pub async fn set_on_complete(&self, callback: CompletionCallback) {
        *self.on_complete.write().await = Some(callback);
    }

    /// Replaces the held URL input.
    pub async fn set_input(&self, url: impl Into<String>) {
        *self.input.write().await = url.into();
    }

    /// The URL input as currently held.
    pub async fn input(&self) -> String {
        self.input.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Submits the held URL for analysis.
    ///
    /// Validation and the duplicate check run before any network call. On
    /// success the input is cleared and the completion callback fires; on
    /// any failure the input is left untouched and the callback is not
    /// invoked.
    ///
    /// # Arguments
    ///
    /// * `history` - The caller's current history, used for the
    ///   case-insensitive duplicate check
    pub async fn submit(&self, history: &[HistoryEntry]) -> Result<AnalyzedArticle> {
        if self.loading.swap(true, Ordering::SeqCst) {
            return Err(TruthlensError::busy("An analysis is already in progress"));
        }
        let result = self.submit_inner(history).await;
        self.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self, history: &[HistoryEntry]) -> Result<AnalyzedArticle> {
        let input = self.input.read().await.clone();
        let trimmed = input.trim().to_string();

        validation::validate_url(&trimmed)?;

        let normalized = trimmed.to_lowercase();
        let duplicate = history
            .iter()
            .any(|entry| entry.article.url.trim().to_lowercase() == normalized);
        if duplicate {
            return Err(TruthlensError::validation(
                "url",
                "Article has already been analyzed",
            ));
        }

        let started = Instant::now();
        let analyzed = self.articles.analyze(&trimmed).await?;

        // Hold a successful result until the progress animation has had
        // its configured minimum time on screen.
        let elapsed = started.elapsed();
        if elapsed < self.config.min_display {
            tokio::time::sleep(self.config.min_display - elapsed).await;
        }

        self.input.write().await.clear();
        if let Some(callback) = self.on_complete.read().await.as_ref() {
            callback();
        }
        tracing::info!(
            target: "truthlens::submission",
            score = analyzed.analysis.score,
            label = %analyzed.analysis.label,
            "analysis complete"
        );
        Ok(analyzed)
    }
}
