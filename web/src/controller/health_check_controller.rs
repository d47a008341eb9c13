use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET liveness check for load balancers and uptime checks
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Webhook receiver is up and responding to requests", body = String),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
