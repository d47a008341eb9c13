//! Typed webhook events and the registry of known event types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::error::{decode_error, DecodeErrorKind, Error};
use crate::types::{Payment, RecurringPayment};

/// Every event type Tebex delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Validation,
    PaymentCompleted,
    PaymentDeclined,
    PaymentRefunded,
    PaymentDisputeOpened,
    PaymentDisputeWon,
    PaymentDisputeLost,
    PaymentDisputeClosed,
    RecurringPaymentStarted,
    RecurringPaymentRenewed,
    RecurringPaymentEnded,
    RecurringPaymentStatusChanged,
}

/// The JSON shape of an event's `subject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectShape {
    Empty,
    Payment,
    RecurringPayment,
}

impl EventType {
    pub const ALL: [EventType; 12] = [
        EventType::Validation,
        EventType::PaymentCompleted,
        EventType::PaymentDeclined,
        EventType::PaymentRefunded,
        EventType::PaymentDisputeOpened,
        EventType::PaymentDisputeWon,
        EventType::PaymentDisputeLost,
        EventType::PaymentDisputeClosed,
        EventType::RecurringPaymentStarted,
        EventType::RecurringPaymentRenewed,
        EventType::RecurringPaymentEnded,
        EventType::RecurringPaymentStatusChanged,
    ];

    /// Returns the wire tag (e.g., "payment.completed")
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Validation => "validation.webhook",
            EventType::PaymentCompleted => "payment.completed",
            EventType::PaymentDeclined => "payment.declined",
            EventType::PaymentRefunded => "payment.refunded",
            EventType::PaymentDisputeOpened => "payment.dispute.opened",
            EventType::PaymentDisputeWon => "payment.dispute.won",
            EventType::PaymentDisputeLost => "payment.dispute.lost",
            EventType::PaymentDisputeClosed => "payment.dispute.closed",
            EventType::RecurringPaymentStarted => "recurring-payment.started",
            EventType::RecurringPaymentRenewed => "recurring-payment.renewed",
            EventType::RecurringPaymentEnded => "recurring-payment.ended",
            EventType::RecurringPaymentStatusChanged => "recurring-payment.status-changed",
        }
    }

    pub fn subject_shape(&self) -> SubjectShape {
        match self {
            EventType::Validation => SubjectShape::Empty,
            EventType::PaymentCompleted
            | EventType::PaymentDeclined
            | EventType::PaymentRefunded
            | EventType::PaymentDisputeOpened
            | EventType::PaymentDisputeWon
            | EventType::PaymentDisputeLost
            | EventType::PaymentDisputeClosed => SubjectShape::Payment,
            EventType::RecurringPaymentStarted
            | EventType::RecurringPaymentRenewed
            | EventType::RecurringPaymentEnded
            | EventType::RecurringPaymentStatusChanged => SubjectShape::RecurringPayment,
        }
    }
}

/// Resolve a wire tag to its event type.
pub fn lookup(tag: &str) -> Result<EventType, Error> {
    tag.parse()
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == tag)
            .ok_or_else(|| {
                decode_error::<serde_json::Error>(
                    DecodeErrorKind::UnknownEventType(tag.to_string()),
                    None,
                )
            })
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Sent by Tebex when a webhook endpoint is added to a project, to check that the
/// endpoint expects Tebex webhooks. Carries no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationEvent {}

/// The decoded `subject` of an event. The variant determines the event type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventSubject {
    Validation(ValidationEvent),
    PaymentCompleted(Payment),
    PaymentDeclined(Payment),
    PaymentRefunded(Payment),
    PaymentDisputeOpened(Payment),
    PaymentDisputeWon(Payment),
    PaymentDisputeLost(Payment),
    PaymentDisputeClosed(Payment),
    RecurringPaymentStarted(RecurringPayment),
    RecurringPaymentRenewed(RecurringPayment),
    RecurringPaymentEnded(RecurringPayment),
    RecurringPaymentStatusChanged(RecurringPayment),
}

impl EventSubject {
    /// Decode a raw `subject` into the variant registered for `event_type`.
    ///
    /// A validation event has no data, so its subject may be `null` or any object.
    pub fn decode(event_type: EventType, subject: &RawValue) -> Result<Self, Error> {
        let raw = subject.get();

        Ok(match event_type {
            EventType::Validation if raw == "null" => EventSubject::Validation(ValidationEvent {}),
            EventType::Validation => EventSubject::Validation(decode_shape(event_type, raw)?),
            EventType::PaymentCompleted => {
                EventSubject::PaymentCompleted(decode_shape(event_type, raw)?)
            }
            EventType::PaymentDeclined => {
                EventSubject::PaymentDeclined(decode_shape(event_type, raw)?)
            }
            EventType::PaymentRefunded => {
                EventSubject::PaymentRefunded(decode_shape(event_type, raw)?)
            }
            EventType::PaymentDisputeOpened => {
                EventSubject::PaymentDisputeOpened(decode_shape(event_type, raw)?)
            }
            EventType::PaymentDisputeWon => {
                EventSubject::PaymentDisputeWon(decode_shape(event_type, raw)?)
            }
            EventType::PaymentDisputeLost => {
                EventSubject::PaymentDisputeLost(decode_shape(event_type, raw)?)
            }
            EventType::PaymentDisputeClosed => {
                EventSubject::PaymentDisputeClosed(decode_shape(event_type, raw)?)
            }
            EventType::RecurringPaymentStarted => {
                EventSubject::RecurringPaymentStarted(decode_shape(event_type, raw)?)
            }
            EventType::RecurringPaymentRenewed => {
                EventSubject::RecurringPaymentRenewed(decode_shape(event_type, raw)?)
            }
            EventType::RecurringPaymentEnded => {
                EventSubject::RecurringPaymentEnded(decode_shape(event_type, raw)?)
            }
            EventType::RecurringPaymentStatusChanged => {
                EventSubject::RecurringPaymentStatusChanged(decode_shape(event_type, raw)?)
            }
        })
    }

    pub fn event_type(&self) -> EventType {
        match self {
            EventSubject::Validation(_) => EventType::Validation,
            EventSubject::PaymentCompleted(_) => EventType::PaymentCompleted,
            EventSubject::PaymentDeclined(_) => EventType::PaymentDeclined,
            EventSubject::PaymentRefunded(_) => EventType::PaymentRefunded,
            EventSubject::PaymentDisputeOpened(_) => EventType::PaymentDisputeOpened,
            EventSubject::PaymentDisputeWon(_) => EventType::PaymentDisputeWon,
            EventSubject::PaymentDisputeLost(_) => EventType::PaymentDisputeLost,
            EventSubject::PaymentDisputeClosed(_) => EventType::PaymentDisputeClosed,
            EventSubject::RecurringPaymentStarted(_) => EventType::RecurringPaymentStarted,
            EventSubject::RecurringPaymentRenewed(_) => EventType::RecurringPaymentRenewed,
            EventSubject::RecurringPaymentEnded(_) => EventType::RecurringPaymentEnded,
            EventSubject::RecurringPaymentStatusChanged(_) => {
                EventType::RecurringPaymentStatusChanged
            }
        }
    }

    /// The payment, for any `payment.*` event.
    pub fn payment(&self) -> Option<&Payment> {
        match self {
            EventSubject::PaymentCompleted(payment)
            | EventSubject::PaymentDeclined(payment)
            | EventSubject::PaymentRefunded(payment)
            | EventSubject::PaymentDisputeOpened(payment)
            | EventSubject::PaymentDisputeWon(payment)
            | EventSubject::PaymentDisputeLost(payment)
            | EventSubject::PaymentDisputeClosed(payment) => Some(payment),
            _ => None,
        }
    }

    /// The recurring payment, for any `recurring-payment.*` event.
    pub fn recurring_payment(&self) -> Option<&RecurringPayment> {
        match self {
            EventSubject::RecurringPaymentStarted(recurring)
            | EventSubject::RecurringPaymentRenewed(recurring)
            | EventSubject::RecurringPaymentEnded(recurring)
            | EventSubject::RecurringPaymentStatusChanged(recurring) => Some(recurring),
            _ => None,
        }
    }
}

// Derived struct visitors also accept arrays as positional fields; a subject must be
// a JSON object.
fn decode_shape<T: DeserializeOwned>(event_type: EventType, raw: &str) -> Result<T, Error> {
    if !raw.trim_start().starts_with('{') {
        return Err(decode_error::<serde_json::Error>(
            DecodeErrorKind::SubjectShapeMismatch(event_type),
            None,
        ));
    }
    serde_json::from_str(raw)
        .map_err(|e| decode_error(DecodeErrorKind::SubjectShapeMismatch(event_type), Some(e)))
}

/// A verified and fully decoded Tebex webhook event.
///
/// The event type is derived from the subject variant, so the two always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub date: DateTime<Utc>,
    pub subject: EventSubject,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.subject.event_type()
    }
}

// Serializes back to the wire envelope: {id, type, date, subject}.
impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("Event", 4)?;
        envelope.serialize_field("id", &self.id)?;
        envelope.serialize_field("type", &self.event_type())?;
        envelope.serialize_field("date", &self.date)?;
        envelope.serialize_field("subject", &self.subject)?;
        envelope.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn raw(json: &str) -> Box<RawValue> {
        RawValue::from_string(json.to_string()).unwrap()
    }

    #[test]
    fn test_every_tag_round_trips() {
        for event_type in EventType::ALL {
            assert_eq!(lookup(event_type.as_str()).unwrap(), event_type);
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = lookup("foo.bar").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Decode(DecodeErrorKind::UnknownEventType("foo.bar".to_string()))
        );
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!(lookup("Payment.Completed").is_err());
        assert!(lookup("").is_err());
    }

    #[test]
    fn test_subject_shapes() {
        let count = |shape| {
            EventType::ALL
                .iter()
                .filter(|t| t.subject_shape() == shape)
                .count()
        };
        assert_eq!(count(SubjectShape::Empty), 1);
        assert_eq!(count(SubjectShape::Payment), 7);
        assert_eq!(count(SubjectShape::RecurringPayment), 4);
    }

    #[test]
    fn test_decoded_subject_carries_its_event_type() {
        let payment = raw(r#"{"transaction_id":"tx_1"}"#);
        let recurring = raw(r#"{"reference":"rp_1"}"#);
        let empty = raw("{}");

        for event_type in EventType::ALL {
            let subject = match event_type.subject_shape() {
                SubjectShape::Empty => &empty,
                SubjectShape::Payment => &payment,
                SubjectShape::RecurringPayment => &recurring,
            };
            let decoded = EventSubject::decode(event_type, subject).unwrap();
            assert_eq!(decoded.event_type(), event_type);
        }
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = EventSubject::decode(EventType::PaymentRefunded, &raw(r#"{"reference":"rp_1"}"#))
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Decode(DecodeErrorKind::SubjectShapeMismatch(
                EventType::PaymentRefunded
            ))
        );
        assert!(err.source.is_some());
    }

    #[test]
    fn test_null_subject_only_allowed_for_validation() {
        assert_eq!(
            EventSubject::decode(EventType::Validation, &raw("null")).unwrap(),
            EventSubject::Validation(ValidationEvent {})
        );
        assert!(EventSubject::decode(EventType::PaymentCompleted, &raw("null")).is_err());
        assert!(EventSubject::decode(EventType::RecurringPaymentEnded, &raw("null")).is_err());
    }

    #[test]
    fn test_validation_subject_must_be_an_object() {
        assert!(EventSubject::decode(EventType::Validation, &raw("{}")).is_ok());
        assert!(EventSubject::decode(EventType::Validation, &raw(r#""text""#)).is_err());
        assert!(EventSubject::decode(EventType::Validation, &raw("[]")).is_err());
    }

    #[test]
    fn test_array_subject_is_rejected() {
        for (event_type, subject) in [
            (EventType::PaymentCompleted, r#"["tx_1"]"#),
            (EventType::RecurringPaymentStarted, r#"["rp_1"]"#),
        ] {
            let err = EventSubject::decode(event_type, &raw(subject)).unwrap_err();
            assert_eq!(
                err.error_kind,
                ErrorKind::Decode(DecodeErrorKind::SubjectShapeMismatch(event_type))
            );
        }
    }

    #[test]
    fn test_accessors() {
        let subject =
            EventSubject::decode(EventType::PaymentDeclined, &raw(r#"{"transaction_id":"tx_9"}"#))
                .unwrap();
        assert_eq!(subject.payment().unwrap().transaction_id, "tx_9");
        assert!(subject.recurring_payment().is_none());
    }
}
