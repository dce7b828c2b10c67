//! First-party API gateway over HTTPS.
//!
//! Implements [`ArticleGateway`] and [`AccountGateway`] against the
//! truthlens backend. Requests carry a bearer token whenever a session
//! exists; responses use the `{ "data": ... }` envelope.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use truthlens_core::account::{AccountGateway, AvatarRef};
use truthlens_core::article::{
    AnalyzedArticle, Analysis, Article, ArticleGateway, HistoryEntry,
};
use truthlens_core::error::{Result, TruthlensError};
use truthlens_core::identity::IdentityProvider;

use crate::status;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Analysis can take a while on the backend; give it more headroom.
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for the first-party analysis and account endpoints.
pub struct HttpArticleApi {
    client: Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

/// Standard response envelope used by the backend.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Wire shape of an analyzed article: article fields flattened alongside
/// the nested analysis.
#[derive(Debug, Deserialize)]
struct ArticlePayload {
    id: String,
    url: String,
    title: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    collected_date: Option<DateTime<Utc>>,
    analysis: Analysis,
}

impl From<ArticlePayload> for AnalyzedArticle {
    fn from(payload: ArticlePayload) -> Self {
        Self {
            article: Article {
                id: payload.id,
                url: payload.url,
                title: payload.title,
                source: payload.source,
                collected_date: payload.collected_date,
            },
            analysis: payload.analysis,
        }
    }
}

impl HttpArticleApi {
    /// Creates a gateway for the given API base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the first-party API
    /// * `identity` - Provider queried for the current bearer token
    pub fn new(base_url: impl Into<String>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            identity,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Bearer header value for the current session, if any.
    async fn auth_header(&self) -> Result<Option<String>> {
        Ok(self
            .identity
            .current_session()
            .await?
            .map(|session| format!("Bearer {}", session.access_token)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut request = request;
        if let Some(header) = self.auth_header().await? {
            request = request.header("Authorization", header);
        }
        request.send().await.map_err(|e| status::network_error(&e))
    }

    /// Checks the status and decodes the enveloped payload.
    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status::api_error(status.as_u16(), &body));
        }
        response.json::<Envelope<T>>().await.map(|e| e.data).map_err(|e| {
            TruthlensError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse API response: {e}"),
            }
        })
    }
}

#[async_trait::async_trait]
impl ArticleGateway for HttpArticleApi {
    async fn analyze(&self, url: &str) -> Result<AnalyzedArticle> {
        tracing::info!(target: "truthlens::api", "submitting article for analysis");
        let request = self
            .client
            .post(self.endpoint("/api/v1/articles/analyze"))
            .json(&serde_json::json!({ "url": url }))
            .timeout(ANALYZE_TIMEOUT);
        let response = self.send(request).await?;
        let payload: ArticlePayload = self.decode(response).await?;
        Ok(payload.into())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let request = self
            .client
            .get(self.endpoint("/api/v1/articles/history"))
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn clear_history(&self) -> Result<()> {
        let request = self
            .client
            .delete(self.endpoint("/api/v1/articles/history"))
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status::api_error(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn article(&self, id: &str) -> Result<AnalyzedArticle> {
        let request = self
            .client
            .get(self.endpoint(&format!("/api/v1/articles/{id}")))
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(request).await?;
        if response.status().as_u16() == 404 {
            return Err(TruthlensError::not_found("article", id));
        }
        let payload: ArticlePayload = self.decode(response).await?;
        Ok(payload.into())
    }
}

#[async_trait::async_trait]
impl AccountGateway for HttpArticleApi {
    async fn upload_avatar(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime: &str,
    ) -> Result<AvatarRef> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| TruthlensError::validation("file", format!("Invalid mime type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.endpoint("/api/v1/users/avatar"))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn delete_account(&self) -> Result<()> {
        tracing::warn!(target: "truthlens::api", "deleting account");
        let request = self
            .client
            .delete(self.endpoint("/api/v1/users/account"))
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status::api_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_payload_decodes_envelope() {
        let body = r#"{
            "data": {
                "id": "a-17",
                "url": "https://example.com/story",
                "title": "Example Story",
                "source": "Example News",
                "analysis": {
                    "label": "RELIABLE",
                    "score": 0.92,
                    "genre": "Science",
                    "related": [{"url": "https://other.example.com/coverage"}],
                    "is_satire": false
                }
            }
        }"#;
        let envelope: Envelope<ArticlePayload> = serde_json::from_str(body).unwrap();
        let analyzed: AnalyzedArticle = envelope.data.into();
        assert_eq!(analyzed.article.id, "a-17");
        assert_eq!(analyzed.analysis.label, "RELIABLE");
        assert_eq!(analyzed.analysis.related.len(), 1);
        assert!(!analyzed.analysis.is_satire);
    }

    #[test]
    fn test_history_entry_decodes() {
        let body = r#"{
            "data": [{
                "created_at": "2026-08-01T12:00:00Z",
                "article": {
                    "id": "a-1",
                    "url": "https://example.com/mars",
                    "title": "Mars Discovery",
                    "source": "Space.com"
                },
                "analysis": {"label": "RELIABLE", "score": 0.88}
            }]
        }"#;
        let envelope: Envelope<Vec<HistoryEntry>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].article.url, "https://example.com/mars");
        assert!(envelope.data[0].analysis.related.is_empty());
    }
}
