//! Application wiring.
//!
//! Builds the HTTP implementations, the stores, and the workflow
//! controllers into a single shareable context. A UI shell constructs one
//! `AppContext` at startup and hands pieces of it to its views.

use std::sync::Arc;

use tokio::sync::Mutex;

use truthlens_core::config::AppConfig;
use truthlens_core::error::Result;
use truthlens_core::identity::IdentityProvider;
use truthlens_infrastructure::{HttpArticleApi, HttpIdentityProvider};

use crate::account::AccountService;
use crate::navigation::{NavigationController, Navigator, run_event_pump};
use crate::stores::Stores;
use crate::submission::{SubmissionConfig, SubmissionController};
use crate::welcome::{InMemorySessionFlags, WelcomeMessageService};

/// The assembled client: capability implementations, stores, and
/// controllers, all sharing one identity provider.
pub struct AppContext {
    pub config: AppConfig,
    pub identity: Arc<HttpIdentityProvider>,
    pub stores: Arc<Stores>,
    pub submission: Arc<SubmissionController>,
    pub account: Arc<AccountService>,
    pub welcome: Arc<WelcomeMessageService>,
    pub navigation: Arc<Mutex<NavigationController>>,
}

impl AppContext {
    /// Wires the full dependency graph from the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let identity = Arc::new(HttpIdentityProvider::new(&config));
        let identity_dyn: Arc<dyn IdentityProvider> = identity.clone();
        let api = Arc::new(HttpArticleApi::new(
            config.api_base_url.clone(),
            identity_dyn.clone(),
        ));

        let stores = Arc::new(Stores::new(identity_dyn.clone(), api.clone()));
        let submission = Arc::new(SubmissionController::new(
            api.clone(),
            SubmissionConfig::default(),
        ));
        let account = Arc::new(AccountService::new(
            api,
            identity_dyn,
            Arc::clone(&stores.profile),
        ));
        let welcome = Arc::new(WelcomeMessageService::new(Arc::new(
            InMemorySessionFlags::new(),
        )));

        Self {
            config,
            identity,
            stores,
            submission,
            account,
            welcome,
            navigation: Arc::new(Mutex::new(NavigationController::new())),
        }
    }

    /// Wires the context from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AppConfig::from_env()?))
    }

    /// Spawns the navigation event pump over the provider's event stream.
    ///
    /// The returned handle runs until the provider drops its channel; a
    /// shell typically keeps it for the process lifetime.
    pub fn spawn_navigation(&self, navigator: Arc<dyn Navigator>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(run_event_pump(
            Arc::clone(&self.navigation),
            self.identity.subscribe(),
            navigator,
            Arc::clone(&self.stores),
        ))
    }
}
