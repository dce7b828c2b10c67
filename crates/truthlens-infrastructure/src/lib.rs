//! Network implementations of the truthlens capability traits.
//!
//! - `HttpArticleApi`: first-party analysis/account API over HTTPS
//! - `HttpIdentityProvider`: hosted identity service (auth + profile table)
//! - `status`: HTTP status and error-body mapping to user-facing messages

mod api_gateway;
mod identity;
pub mod status;

pub use api_gateway::HttpArticleApi;
pub use identity::HttpIdentityProvider;
