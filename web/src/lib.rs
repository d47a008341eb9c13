use std::net::SocketAddr;

use log::*;
pub use service::AppState;

mod controller;
mod error;
pub(crate) mod router;

pub use error::{Error, Result};

/// Binds the configured interface and port and serves the webhook routes until
/// Ctrl-C is received.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_string();
    let port = app_state.config.port;
    let server_url = format!("{host}:{port}");

    info!(
        "Server starting... listening for connections on http://{server_url} ({} environment)",
        app_state.config.runtime_env()
    );

    let listener = tokio::net::TcpListener::bind(&server_url).await?;
    let app = router::define_routes(app_state);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, stopping server");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
}
