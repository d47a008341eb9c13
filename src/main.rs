use std::sync::Arc;

use events::{spawn_dispatcher, EventPublisher, EventQueue, LogEventHandler};
use log::{error, info, warn};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up Tebex webhook receiver [{}]...", config.runtime_env());

    if !config.has_webhook_secret() {
        if config.is_production() {
            error!("WEBHOOK_SECRET must be set in production, refusing to start");
            std::process::exit(1);
        }
        warn!("No webhook secret configured, signatures will NOT be verified");
    }
    if !config.check_source_ip {
        warn!("Source address check disabled, webhooks are accepted from any address");
    }

    let (event_queue, receiver) = EventQueue::new(config.event_queue_capacity);
    let publisher = EventPublisher::new().with_handler(Arc::new(LogEventHandler));
    let dispatcher = spawn_dispatcher(receiver, publisher);

    let app_state = AppState::new(config, event_queue);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }

    // The router, and with it the last queue handle, is gone once the server stops.
    if let Err(e) = dispatcher.await {
        error!("Event dispatcher stopped abnormally: {e}");
    }
    info!("Shutdown complete");
}
