//! Application layer for the truthlens client.
//!
//! Everything a UI shell calls lives here: the single-flight request cache,
//! the session/profile/history stores built on it, the auth-driven
//! navigation state machine, and the article submission workflow.
//!
//! # Module Structure
//!
//! - `cache`: `RequestCache`, the single-flight memoized fetch primitive
//! - `stores`: `SessionStore`, `ProfileStore`, `HistoryStore`, and their
//!   shared teardown
//! - `navigation`: `NavigationController` state machine and event pump
//! - `submission`: `SubmissionController` for analyzing article URLs
//! - `welcome`: session-scoped welcome message
//! - `account`: avatar upload, password change, account deletion
//! - `context`: wiring of the HTTP implementations into the above
//! - `telemetry`: tracing initialization

pub mod account;
pub mod cache;
pub mod context;
pub mod navigation;
pub mod stores;
pub mod submission;
pub mod telemetry;
pub mod welcome;

pub use account::AccountService;
pub use cache::RequestCache;
pub use context::AppContext;
pub use navigation::{AuthFlowState, Location, NavigationController, Navigator};
pub use stores::{HistoryStore, ProfileStore, SessionStore, Stores};
pub use submission::{SubmissionConfig, SubmissionController};
pub use welcome::{InMemorySessionFlags, SessionFlags, WelcomeMessageService};
