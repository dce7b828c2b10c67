//! Error types for the truthlens client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured category for errors reported by the identity provider.
///
/// The provider frequently reports failures as free-form message strings,
/// so classification falls back to message sniffing when no stable code is
/// available. Callers should branch on this enum, never on raw messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    /// Wrong email/password combination.
    InvalidCredentials,
    /// The account exists but the email address was never confirmed.
    EmailNotConfirmed,
    /// A username uniqueness constraint was violated.
    DuplicateUsername,
    /// The email address is already registered.
    AlreadyRegistered,
    /// The provider throttled the request.
    RateLimited,
    /// The provider rejected the password as too weak.
    WeakPassword,
    /// Anything the provider did not identify.
    Unknown,
}

impl AuthErrorCode {
    /// Best-effort classification of a raw provider message.
    ///
    /// Known fragility inherited from the source system: the hosted provider
    /// surfaces database constraint violations and throttling as message
    /// text, so this sniffs for the usual phrasings. A stable error code,
    /// when present, always takes precedence over this function.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("invalid login credentials") || lower.contains("invalid credentials") {
            Self::InvalidCredentials
        } else if lower.contains("not confirmed") || lower.contains("email confirmation") {
            Self::EmailNotConfirmed
        } else if lower.contains("duplicate")
            || lower.contains("unique")
            || lower.contains("already taken")
            || lower.contains("database error")
        {
            Self::DuplicateUsername
        } else if lower.contains("already registered") || lower.contains("already exists") {
            Self::AlreadyRegistered
        } else if lower.contains("rate limit") || lower.contains("too many requests") {
            Self::RateLimited
        } else if lower.contains("weak password") || lower.contains("password should") {
            Self::WeakPassword
        } else {
            Self::Unknown
        }
    }
}

/// A shared error type for the entire truthlens client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TruthlensError {
    /// Local validation failure, tied to a specific input field.
    /// Never reaches the network.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Identity-provider failure with a structured category.
    #[error("{message}")]
    Auth {
        code: AuthErrorCode,
        message: String,
    },

    /// Non-2xx response from the first-party API.
    #[error("API error: {status} {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection, timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An operation was rejected because a previous one is still running.
    #[error("{0}")]
    Busy(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TruthlensError {
    /// Creates a Validation error for a named field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Creates an Auth error with an explicit code.
    pub fn auth(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self::Auth {
            code,
            message: message.into(),
        }
    }

    /// Creates an Auth error, classifying the code from the raw message.
    pub fn auth_from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Auth {
            code: AuthErrorCode::classify(&message),
            message,
        }
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Busy error
    pub fn busy(message: impl Into<String>) -> Self {
        Self::Busy(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a local validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is an identity-provider error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the auth error code, if this is an identity-provider error.
    pub fn auth_code(&self) -> Option<AuthErrorCode> {
        match self {
            Self::Auth { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the failure means the user must complete email verification
    /// before the operation can succeed.
    pub fn requires_verification(&self) -> bool {
        self.auth_code() == Some(AuthErrorCode::EmailNotConfirmed)
    }

    /// The string shown to the user for this error.
    ///
    /// Most variants display their message as-is; a handful of provider
    /// categories get a fixed phrasing regardless of the raw message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth {
                code: AuthErrorCode::DuplicateUsername,
                ..
            } => "Username is already taken".to_string(),
            Self::Auth {
                code: AuthErrorCode::RateLimited,
                ..
            } => "Too many requests. Please slow down and try again later.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for TruthlensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for TruthlensError {
    fn from(err: url::ParseError) -> Self {
        Self::validation("url", err.to_string())
    }
}

/// A type alias for `Result<T, TruthlensError>`.
pub type Result<T> = std::result::Result<T, TruthlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_duplicate_phrasings() {
        for message in [
            "duplicate key value violates unique constraint \"profiles_username_key\"",
            "value violates UNIQUE constraint",
            "username already taken",
            "Database error saving new user",
        ] {
            assert_eq!(
                AuthErrorCode::classify(message),
                AuthErrorCode::DuplicateUsername,
                "message: {message}"
            );
        }
    }

    #[test]
    fn test_classify_unconfirmed_email() {
        assert_eq!(
            AuthErrorCode::classify("Email not confirmed"),
            AuthErrorCode::EmailNotConfirmed
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(
            AuthErrorCode::classify("something exploded"),
            AuthErrorCode::Unknown
        );
    }

    #[test]
    fn test_duplicate_username_user_message_is_exact() {
        let err = TruthlensError::auth_from_message(
            "duplicate key value violates unique constraint",
        );
        assert_eq!(err.user_message(), "Username is already taken");
    }

    #[test]
    fn test_requires_verification() {
        let err = TruthlensError::auth(AuthErrorCode::EmailNotConfirmed, "Email not confirmed");
        assert!(err.requires_verification());
        assert!(!TruthlensError::network("boom").requires_verification());
    }
}
