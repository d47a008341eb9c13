use config::Config;
use events::EventQueue;
use secrecy::SecretString;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_queue: EventQueue,
    webhook_secret: Arc<SecretString>,
}

impl AppState {
    pub fn new(app_config: Config, event_queue: EventQueue) -> Self {
        Self {
            webhook_secret: app_config.webhook_secret(),
            config: app_config,
            event_queue,
        }
    }

    pub fn webhook_secret(&self) -> &SecretString {
        self.webhook_secret.as_ref()
    }
}
