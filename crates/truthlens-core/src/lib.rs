//! Domain layer for the truthlens client.
//!
//! This crate contains the domain models, validation rules, configuration,
//! and capability traits that the application layer is written against.
//! Network implementations live in `truthlens-infrastructure`.

pub mod account;
pub mod article;
pub mod config;
pub mod error;
pub mod identity;
pub mod profile;
pub mod route;
pub mod session;
pub mod validation;

// Re-export common error type
pub use error::{AuthErrorCode, Result, TruthlensError};
