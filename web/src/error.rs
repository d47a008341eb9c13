use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use events::QueueError;
use webhook::error::{
    DecodeErrorKind, Error as WebhookError, ErrorKind as WebhookErrorKind, SignatureErrorKind,
    TransportErrorKind,
};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The payload was rejected by the webhook pipeline.
    Webhook(WebhookError),
    /// The payload was accepted but could not be handed to the dispatcher.
    Queue(QueueError),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Webhook(e) => Some(e),
            Error::Queue(e) => Some(e),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::Webhook(e) => write!(fmt, "{e}"),
            Error::Queue(e) => write!(fmt, "{e}"),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Webhook(e) => match &e.error_kind {
                WebhookErrorKind::Transport(transport_error_kind) => match transport_error_kind {
                    TransportErrorKind::InvalidSource(_) => StatusCode::FORBIDDEN,
                    TransportErrorKind::InvalidContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    TransportErrorKind::MissingSignature => StatusCode::UNAUTHORIZED,
                    TransportErrorKind::BodyRead => StatusCode::BAD_REQUEST,
                },
                WebhookErrorKind::Signature(SignatureErrorKind::InvalidSignature) => {
                    StatusCode::UNAUTHORIZED
                }
                WebhookErrorKind::Decode(decode_error_kind) => match decode_error_kind {
                    DecodeErrorKind::MalformedEnvelope
                    | DecodeErrorKind::UnknownEventType(_)
                    | DecodeErrorKind::SubjectShapeMismatch(_) => StatusCode::BAD_REQUEST,
                },
            },
            // Tebex redelivers webhooks answered with a non-2xx status.
            Error::Queue(QueueError::Full) | Error::Queue(QueueError::Closed) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<WebhookError> for Error {
    fn from(err: WebhookError) -> Self {
        Error::Webhook(err)
    }
}

impl From<QueueError> for Error {
    fn from(err: QueueError) -> Self {
        Error::Queue(err)
    }
}
