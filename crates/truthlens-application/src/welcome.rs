//! Session-scoped welcome message.
//!
//! The greeting shows once per client session after the first
//! authenticated render, tracked by a flag in session-scoped storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Timelike;
use rand::Rng;

use truthlens_core::session::UserIdentity;

const WELCOME_FLAG: &str = "welcome_message_shown";

/// Fixed greetings; the last slot is replaced by a time-of-day greeting.
const WELCOME_MESSAGES: [&str; 3] = ["Hello", "Welcome back", "How's it going"];

/// Session-scoped string flags (the tab-session storage surface).
///
/// Values live as long as the client session and are not persisted.
pub trait SessionFlags: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory flag store; the default for a headless client.
#[derive(Default)]
pub struct InMemorySessionFlags {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemorySessionFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionFlags for InMemorySessionFlags {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.write().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.write().unwrap().remove(key);
    }
}

/// Greeting appropriate for the hour of day (24h clock).
pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=21 => "Good evening",
        _ => "Good night",
    }
}

/// Decides whether and what to greet the user with.
pub struct WelcomeMessageService {
    flags: Arc<dyn SessionFlags>,
}

impl WelcomeMessageService {
    pub fn new(flags: Arc<dyn SessionFlags>) -> Self {
        Self { flags }
    }

    /// A greeting for the first authenticated render of this session, or
    /// `None` if it was already shown. Passing no user clears the flag so
    /// the next sign-in greets again.
    pub fn greeting(&self, user: Option<&UserIdentity>) -> Option<String> {
        if user.is_none() {
            self.flags.remove(WELCOME_FLAG);
            return None;
        }
        if self.flags.get(WELCOME_FLAG).is_some() {
            return None;
        }

        let index = rand::thread_rng().gen_range(0..=WELCOME_MESSAGES.len());
        let message = if index == WELCOME_MESSAGES.len() {
            time_greeting(chrono::Local::now().hour())
        } else {
            WELCOME_MESSAGES[index]
        };
        Some(message.to_string())
    }

    /// Records that the greeting was displayed.
    pub fn mark_shown(&self) {
        self.flags.set(WELCOME_FLAG, "true");
    }
}
