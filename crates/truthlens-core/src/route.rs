//! Client routes and URL fragment tokens.
//!
//! The identity provider's email links land the user back on the site with
//! a token in the URL's hash portion; `FragmentToken` classifies it.

use serde::{Deserialize, Serialize};

/// The pages the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Login / signup page
    Login,
    /// Main authenticated page
    Dashboard,
    /// Static "verify your email" page, reached from the confirmation link
    VerifyEmail,
    /// Static password reset page, reached from the recovery link
    ResetPassword,
}

impl Route {
    /// The URL path for this route.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Dashboard => "/dashboard",
            Self::VerifyEmail => "/verify",
            Self::ResetPassword => "/reset-password",
        }
    }

    /// Resolves a URL path to a route, if it matches one.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Login),
            "/dashboard" => Some(Self::Dashboard),
            "/verify" => Some(Self::VerifyEmail),
            "/reset-password" => Some(Self::ResetPassword),
            _ => None,
        }
    }

    /// True for the static pages reached by following an out-of-band email
    /// link. The navigation layer never redirects away from these.
    pub fn is_static_auth_page(&self) -> bool {
        matches!(self, Self::VerifyEmail | Self::ResetPassword)
    }
}

/// Token carried in the URL fragment by a provider redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentToken {
    /// `type=signup`: the user followed an email confirmation link.
    SignupConfirmation,
    /// `type=recovery`: the user followed a password recovery link.
    Recovery,
}

impl FragmentToken {
    /// Parses the hash portion of a URL (with or without the leading `#`).
    ///
    /// The provider encodes the flow type as a `type` key among the
    /// `&`-separated fragment parameters.
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        for pair in fragment.split('&') {
            if let Some(value) = pair.strip_prefix("type=") {
                return match value {
                    "signup" => Some(Self::SignupConfirmation),
                    "recovery" => Some(Self::Recovery),
                    _ => None,
                };
            }
        }
        None
    }
}
