//! Session domain module.
//!
//! Contains the session model issued by the identity provider and the
//! auth event stream consumed by the navigation layer and the stores.
//!
//! # Module Structure
//!
//! - `model`: `Session` and `UserIdentity`
//! - `event`: `AuthEvent` broadcast on sign-in/sign-out

mod event;
mod model;

// Re-export public API
pub use event::AuthEvent;
pub use model::{Session, UserIdentity};
