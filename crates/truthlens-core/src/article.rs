//! Article and analysis domain models, plus the analysis API gateway trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A collected article as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Backend-assigned article identifier
    pub id: String,
    /// Canonical URL the article was collected from
    pub url: String,
    /// Article headline
    pub title: String,
    /// Publication the article came from
    #[serde(default)]
    pub source: Option<String>,
    /// When the backend collected the article
    #[serde(default)]
    pub collected_date: Option<DateTime<Utc>>,
}

/// A reference to a related article in an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedArticle {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// The credibility verdict for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Verdict label, e.g. "RELIABLE" or "UNRELIABLE"
    pub label: String,
    /// Truth score in `[0.0, 1.0]`
    pub score: f64,
    /// Detected genre of the article
    #[serde(default)]
    pub genre: Option<String>,
    /// Related coverage found during analysis
    #[serde(default)]
    pub related: Vec<RelatedArticle>,
    /// True when the article was identified as satire
    #[serde(default)]
    pub is_satire: bool,
}

/// The result of submitting one article for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub article: Article,
    pub analysis: Analysis,
}

/// One entry in the caller's server-owned analysis history.
///
/// The list is append-only from the client's perspective; "clear" is a
/// destructive bulk operation behind an explicit confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When this entry was recorded
    pub created_at: DateTime<Utc>,
    pub article: Article,
    pub analysis: Analysis,
}

/// Gateway to the first-party article analysis API.
#[async_trait::async_trait]
pub trait ArticleGateway: Send + Sync {
    /// Submits a URL for credibility analysis.
    async fn analyze(&self, url: &str) -> Result<AnalyzedArticle>;

    /// Fetches the caller's full analysis history.
    async fn history(&self) -> Result<Vec<HistoryEntry>>;

    /// Deletes the caller's entire analysis history.
    async fn clear_history(&self) -> Result<()>;

    /// Fetches a single analyzed article by id.
    async fn article(&self, id: &str) -> Result<AnalyzedArticle>;
}
