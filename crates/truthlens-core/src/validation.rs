//! Local input validation.
//!
//! Every rule here runs before any network call and fails fast with a
//! field-specific `Validation` error.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{Result, TruthlensError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("username regex"));

/// Hostnames that are rejected outright for analysis.
const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "0.0.0.0"];

/// Validates an article URL: absolute http(s), a real-looking domain,
/// and not a local address.
pub fn validate_url(input: &str) -> Result<()> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TruthlensError::validation("url", "URL is required"));
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(TruthlensError::validation(
            "url",
            "URL must start with http:// or https://",
        ));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|_| TruthlensError::validation("url", "Please enter a valid URL"))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| TruthlensError::validation("url", "Please enter a valid URL"))?;

    if LOCAL_HOSTS.iter().any(|local| host.contains(local)) {
        return Err(TruthlensError::validation(
            "url",
            "Cannot analyze local URLs",
        ));
    }

    if !host.contains('.') {
        return Err(TruthlensError::validation("url", "Invalid domain name"));
    }

    Ok(())
}

/// Validates an email address shape.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(TruthlensError::validation("email", "Email is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(TruthlensError::validation(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

/// Validates password strength rules: at least 8 characters with upper,
/// lower, and numeric characters.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(TruthlensError::validation(
            "password",
            "Password is required",
        ));
    }
    if password.len() < 8 {
        return Err(TruthlensError::validation(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(TruthlensError::validation(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(TruthlensError::validation(
            "password",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(TruthlensError::validation(
            "password",
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

/// Validates a username: 3–20 characters from `[a-zA-Z0-9_-]`.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(TruthlensError::validation(
            "username",
            "Username is required",
        ));
    }
    if username.len() < 3 {
        return Err(TruthlensError::validation(
            "username",
            "Username must be at least 3 characters long",
        ));
    }
    if username.len() > 20 {
        return Err(TruthlensError::validation(
            "username",
            "Username must be 20 characters or less",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(TruthlensError::validation(
            "username",
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Password strength report for the signup form's strength meter.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordStrength {
    /// Strength in percent, `0.0..=100.0`
    pub percent: f64,
    /// Human label for the strength band
    pub label: &'static str,
}

/// Scores a password against length and character-class heuristics.
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            percent: 0.0,
            label: "No password",
        };
    }

    let mut score = 0u8;
    if password.len() >= 8 {
        score += 1;
    }
    if password.len() >= 12 {
        score += 1;
    }
    if password.len() >= 16 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let percent = f64::from(score) / 7.0 * 100.0;
    let label = if percent < 40.0 {
        "Weak"
    } else if percent < 70.0 {
        "Fair"
    } else if percent < 90.0 {
        "Good"
    } else {
        "Strong"
    };

    PasswordStrength { percent, label }
}
