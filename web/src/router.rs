use crate::{
    controller::{health_check_controller, webhook_controller},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Tebex Webhook Receiver"
        ),
        paths(
            health_check_controller::health_check,
            webhook_controller::tebex_webhook,
        ),
        components(
            schemas(
                webhook_controller::WebhookResponse,
                webhook_controller::ValidationResponse,
            )
        ),
        tags(
            (name = "tebex_rs", description = "Verified Tebex webhook intake")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for Tebex webhooks (no session authentication - validated by sender address and signature)
fn webhook_routes(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_body_bytes;
    Router::new()
        .route("/webhooks/tebex", post(webhook_controller::tebex_webhook))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
