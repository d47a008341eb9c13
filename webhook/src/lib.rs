//! # webhook
//!
//! Validation and decoding of Tebex webhooks.
//!
//! A webhook goes through two independent steps:
//!
//! 1. **Validation** ([`validate_payload`] / [`validate_payload_raw`]): the sender
//!    address, `content-type` and `x-signature` headers are checked, then the
//!    signature is verified against the shared secret. The raw body is returned.
//! 2. **Parsing** ([`parse_event`]): a validated body is decoded into a typed
//!    [`Event`], resolving the `type` tag to the matching [`EventSubject`] variant.
//!
//! The steps are separate so that a receiver can validate synchronously while the
//! request is open, queue the raw body, and parse it later.
//!
//! Nothing in this crate logs, retries, or keeps state between calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let body = webhook::validate_payload(request, secret.as_bytes(), true)?;
//! let event = webhook::parse_event(&body)?;
//! if let Some(payment) = event.subject.payment() {
//!     println!("{} {}", event.event_type(), payment.transaction_id);
//! }
//! ```

use std::io::Read;
use std::net::IpAddr;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Request};

pub mod envelope;
pub mod error;
pub mod event;
pub mod guard;
pub mod signature;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use event::{Event, EventSubject, EventType, SubjectShape, ValidationEvent};
pub use guard::WEBHOOK_IP_ADDRESSES;
pub use signature::sign_payload;
pub use types::{Payment, RecurringPayment};

use envelope::RawEnvelope;
use error::TransportErrorKind;

/// Header carrying the hex encoded payload signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Address the webhook request was received from.
///
/// Insert this as a request extension for [`validate_payload`] to check the sender
/// against [`WEBHOOK_IP_ADDRESSES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub IpAddr);

/// Validate an inbound webhook request and return its raw body.
///
/// The request is consumed: its body is read exactly once and dropped on every
/// return path. When `check_ip` is set and the request carries a [`RemoteAddr`]
/// extension, the address must be one of [`WEBHOOK_IP_ADDRESSES`]. Without the
/// extension the address check is skipped.
pub fn validate_payload<B: Read>(
    request: Request<B>,
    secret: &[u8],
    check_ip: bool,
) -> Result<Vec<u8>, Error> {
    let (parts, mut body) = request.into_parts();

    let mut payload = Vec::new();
    body.read_to_end(&mut payload).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Transport(TransportErrorKind::BodyRead),
    })?;
    drop(body);

    let remote_addr = if check_ip {
        parts.extensions.get::<RemoteAddr>().map(|addr| addr.0)
    } else {
        None
    };

    validate_payload_raw(
        header_str(&parts.headers, CONTENT_TYPE.as_str()),
        &payload,
        header_str(&parts.headers, SIGNATURE_HEADER),
        secret,
        remote_addr,
    )?;

    Ok(payload)
}

/// Validate a webhook from its already extracted parts.
///
/// `remote_addr` of `None` skips the sender address check. An empty `secret` skips
/// signature verification (see [`signature::verify_signature`]).
pub fn validate_payload_raw(
    content_type: &str,
    body: &[u8],
    signature: &str,
    secret: &[u8],
    remote_addr: Option<IpAddr>,
) -> Result<(), Error> {
    guard::check_admission(content_type, signature, remote_addr)?;
    signature::verify_signature(body, signature, secret)
}

/// Decode a validated payload into a typed [`Event`].
///
/// The payload must already have passed [`validate_payload`] or
/// [`validate_payload_raw`]; no verification happens here.
pub fn parse_event(payload: &[u8]) -> Result<Event, Error> {
    let envelope = RawEnvelope::decode(payload)?;
    let event_type = event::lookup(&envelope.event_type)?;
    let subject = EventSubject::decode(event_type, &envelope.subject)?;

    Ok(Event {
        id: envelope.id,
        date: envelope.date,
        subject,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}
