//! Controller for handling webhooks from Tebex.
//!
//! Every delivery is validated and parsed while the request is open so that Tebex
//! sees a 4xx for anything we refuse. Parsed events are handed to the dispatcher
//! queue and handled after the response has been sent.

use std::net::SocketAddr;

use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{Extensions, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Buf;
use log::*;
use secrecy::ExposeSecret;
use serde::Serialize;
use utoipa::ToSchema;
use webhook::{EventType, RemoteAddr};

/// Response for webhook acknowledgment
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub status: String,
}

/// Response to Tebex's endpoint validation handshake, echoing the event id.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationResponse {
    pub id: String,
}

/// POST /webhooks/tebex
///
/// Receives webhook deliveries from Tebex. The request is authenticated by its
/// sender address and its `x-signature` HMAC rather than by a session.
#[utoipa::path(
    post,
    path = "/webhooks/tebex",
    params(
        ("x-signature" = String, Header, description = "Hex encoded HMAC-SHA256 of the SHA-256 hex digest of the body, keyed with the webhook secret"),
    ),
    request_body(content = String, content_type = "application/json", description = "Tebex event envelope: {id, type, date, subject}"),
    responses(
        (status = 200, description = "Event accepted for processing, or validation handshake answered", body = WebhookResponse),
        (status = 400, description = "Body is not a known, well formed Tebex event"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 403, description = "Request did not come from a Tebex webhook address"),
        (status = 413, description = "Body exceeds the configured size limit"),
        (status = 415, description = "Content type is not application/json"),
        (status = 503, description = "Event queue is full, Tebex will redeliver later"),
    )
)]
pub async fn tebex_webhook(
    State(app_state): State<AppState>,
    extensions: Extensions,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Error> {
    let remote_addr = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    debug!(
        "Received Tebex webhook ({} bytes) from {}",
        body.len(),
        remote_addr.map_or_else(|| "unknown address".to_string(), |ip| ip.to_string())
    );

    let mut request = Request::new(body.reader());
    *request.headers_mut() = headers;
    if let Some(ip) = remote_addr {
        request.extensions_mut().insert(RemoteAddr(ip));
    }

    let payload = webhook::validate_payload(
        request,
        app_state.webhook_secret().expose_secret().as_bytes(),
        app_state.config.check_source_ip,
    )
    .map_err(|e| {
        warn!("Rejected Tebex webhook: {e}");
        e
    })?;

    let event = webhook::parse_event(&payload).map_err(|e| {
        warn!("Rejected verified Tebex webhook that could not be parsed: {e}");
        e
    })?;

    if event.event_type() == EventType::Validation {
        info!("Answering Tebex webhook validation {}", event.id);
        return Ok((StatusCode::OK, Json(ValidationResponse { id: event.id })).into_response());
    }

    let event_id = event.id.clone();
    let event_type = event.event_type();
    app_state.event_queue.enqueue(event).map_err(|e| {
        error!("Unable to queue Tebex event {event_id} [{event_type}]: {e}");
        e
    })?;
    debug!("Queued Tebex event {event_id} [{event_type}]");

    Ok((
        StatusCode::OK,
        Json(WebhookResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response())
}
