//! The outer `{id, type, date, subject}` envelope shared by every event.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{decode_error, DecodeErrorKind, Error};

/// An envelope whose `subject` has not been interpreted yet. The `type` tag is kept
/// as a string; resolving it is left to the event registry.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: DateTime<Utc>,
    pub subject: Box<RawValue>,
}

impl RawEnvelope {
    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(payload)
            .map_err(|e| decode_error(DecodeErrorKind::MalformedEnvelope, Some(e)))
    }
}
