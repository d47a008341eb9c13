//! Error types for the `webhook` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! error kind tree and an optional source for error chaining. Every kind is terminal,
//! a rejected payload must not be retried with the same input.

use std::error::Error as StdError;
use std::fmt;
use std::net::IpAddr;

use crate::event::EventType;

/// Top-level error type for the webhook crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors, one per pipeline stage that can reject a payload.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Transport(TransportErrorKind),
    Signature(SignatureErrorKind),
    Decode(DecodeErrorKind),
}

/// Errors from the admission checks performed before any hashing.
#[derive(Debug, PartialEq)]
pub enum TransportErrorKind {
    /// The request came from an address outside the sender allow-list.
    InvalidSource(IpAddr),
    InvalidContentType,
    MissingSignature,
    /// The request body could not be read.
    BodyRead,
}

/// Errors from signature verification.
#[derive(Debug, PartialEq)]
pub enum SignatureErrorKind {
    InvalidSignature,
}

/// Errors from decoding a verified payload into an [`Event`](crate::Event).
#[derive(Debug, PartialEq)]
pub enum DecodeErrorKind {
    /// The outer `{id, type, date, subject}` envelope is not valid.
    MalformedEnvelope,
    /// The `type` tag is not one of the known event types.
    UnknownEventType(String),
    /// The `subject` does not match the shape registered for the event type.
    SubjectShapeMismatch(EventType),
}

impl Error {
    /// Returns `true` when the payload failed authentication (source, signature)
    /// rather than being structurally unacceptable.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Transport(TransportErrorKind::InvalidSource(_))
                | ErrorKind::Transport(TransportErrorKind::MissingSignature)
                | ErrorKind::Signature(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Transport(TransportErrorKind::InvalidSource(addr)) => {
                write!(f, "invalid remote ip address: {addr}")
            }
            ErrorKind::Transport(TransportErrorKind::InvalidContentType) => {
                write!(f, "invalid content type")
            }
            ErrorKind::Transport(TransportErrorKind::MissingSignature) => {
                write!(f, "missing signature")
            }
            ErrorKind::Transport(TransportErrorKind::BodyRead) => {
                write!(f, "failed to read request body")
            }
            ErrorKind::Signature(SignatureErrorKind::InvalidSignature) => {
                write!(f, "invalid signature")
            }
            ErrorKind::Decode(DecodeErrorKind::MalformedEnvelope) => {
                write!(f, "failed to unmarshal event envelope")
            }
            ErrorKind::Decode(DecodeErrorKind::UnknownEventType(tag)) => {
                write!(f, "unknown event type: {tag}")
            }
            ErrorKind::Decode(DecodeErrorKind::SubjectShapeMismatch(event_type)) => {
                write!(f, "failed to unmarshal subject for {event_type}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper function to create transport errors.
pub fn transport_error(kind: TransportErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Transport(kind),
    }
}

/// Helper function to create signature errors.
pub fn signature_error(kind: SignatureErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Signature(kind),
    }
}

/// Helper function to create decode errors, keeping the underlying parser error as source.
pub fn decode_error<E>(kind: DecodeErrorKind, source: Option<E>) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error {
        source: source.map(|e| Box::new(e) as Box<dyn StdError + Send + Sync>),
        error_kind: ErrorKind::Decode(kind),
    }
}
