//! Client configuration.
//!
//! All endpoints are environment-configurable so the same build can point at
//! local, staging, or production backends.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Result, TruthlensError};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_SITE_URL: &str = "http://localhost:5173/";

/// Connection settings for the first-party API and the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the first-party analysis API.
    pub api_base_url: String,
    /// Base URL of the hosted identity service.
    pub identity_url: String,
    /// Public (anon) key sent with every identity request.
    pub identity_public_key: String,
    /// Site origin used to build redirect links in verification and
    /// password-reset emails.
    pub site_url: String,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// `TRUTHLENS_API_URL` and `TRUTHLENS_SITE_URL` fall back to local
    /// development defaults; the identity settings are required.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when `TRUTHLENS_IDENTITY_URL` or
    /// `TRUTHLENS_IDENTITY_KEY` is missing.
    pub fn from_env() -> Result<Self> {
        let identity_url = env::var("TRUTHLENS_IDENTITY_URL")
            .map_err(|_| TruthlensError::config("TRUTHLENS_IDENTITY_URL is not set"))?;
        let identity_public_key = env::var("TRUTHLENS_IDENTITY_KEY")
            .map_err(|_| TruthlensError::config("TRUTHLENS_IDENTITY_KEY is not set"))?;

        Ok(Self {
            api_base_url: env::var("TRUTHLENS_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            identity_url,
            identity_public_key,
            site_url: env::var("TRUTHLENS_SITE_URL")
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
        })
    }

    /// The site origin normalized for use in provider redirect links:
    /// scheme is required (https assumed when missing) and a trailing
    /// slash is guaranteed.
    pub fn redirect_url(&self) -> String {
        let mut url = self.site_url.clone();
        if !url.starts_with("http") {
            url = format!("https://{url}");
        }
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            identity_url: String::new(),
            identity_public_key: String::new(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}
