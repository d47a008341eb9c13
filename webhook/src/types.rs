//! Payment value types carried as webhook event subjects.
//!
//! Only the identifying field of each top-level subject is required. Everything else
//! falls back to its default when Tebex omits it or sends `null`, since the set of
//! fields present varies between event types (e.g. `decline_reason` only on declined
//! payments).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numeric payment status as sent by Tebex.
///
/// Tebex does not document statuses `0`, `3` and `4`; they are kept as reserved
/// variants instead of guessing their meaning. Values outside `0..=5` are preserved
/// in [`PaymentStatusType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum PaymentStatusType {
    #[default]
    Unknown0,
    Complete,
    Refund,
    Reserved3,
    Reserved4,
    Cancelled,
    Other(i64),
}

impl From<i64> for PaymentStatusType {
    fn from(value: i64) -> Self {
        match value {
            0 => PaymentStatusType::Unknown0,
            1 => PaymentStatusType::Complete,
            2 => PaymentStatusType::Refund,
            3 => PaymentStatusType::Reserved3,
            4 => PaymentStatusType::Reserved4,
            5 => PaymentStatusType::Cancelled,
            other => PaymentStatusType::Other(other),
        }
    }
}

impl From<PaymentStatusType> for i64 {
    fn from(value: PaymentStatusType) -> Self {
        match value {
            PaymentStatusType::Unknown0 => 0,
            PaymentStatusType::Complete => 1,
            PaymentStatusType::Refund => 2,
            PaymentStatusType::Reserved3 => 3,
            PaymentStatusType::Reserved4 => 4,
            PaymentStatusType::Cancelled => 5,
            PaymentStatusType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: PaymentStatusType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Position of a payment in its sequence. Only `oneoff` and `first` are documented;
/// anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentSequence {
    #[default]
    OneOff,
    First,
    Other(String),
}

impl From<String> for PaymentSequence {
    fn from(value: String) -> Self {
        match value.as_str() {
            "oneoff" => PaymentSequence::OneOff,
            "first" => PaymentSequence::First,
            _ => PaymentSequence::Other(value),
        }
    }
}

impl From<PaymentSequence> for String {
    fn from(value: PaymentSequence) -> Self {
        match value {
            PaymentSequence::OneOff => "oneoff".to_string(),
            PaymentSequence::First => "first".to_string(),
            PaymentSequence::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Price {
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub refundable: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub option: String,
}

/// Game account attached to a customer or a purchased product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: User,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marketing_consent: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPurchase {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paid_price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: User,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeclineReason {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// A single payment. Subject of every `payment.*` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PaymentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_sequence: PaymentSequence,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_paid: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_method: PaymentMethod,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fees: HashMap<String, Price>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer: Customer,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<ProductPurchase>,
    // Undocumented object shapes, kept as raw JSON.
    #[serde(default, deserialize_with = "null_as_default")]
    pub coupons: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gift_cards: Vec<serde_json::Value>,
    /// Only present for payments belonging to a recurring payment.
    #[serde(default)]
    pub recurring_payment_reference: Option<String>,
    /// Only present for declined payments.
    #[serde(default)]
    pub decline_reason: Option<DeclineReason>,
}

/// A subscription. Subject of every `recurring-payment.*` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub reference: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_payment_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PaymentStatus,
    #[serde(default)]
    pub initial_payment: Option<Payment>,
    #[serde(default)]
    pub last_payment: Option<Payment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fail_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    /// Only present once the status is [`PaymentStatusType::Cancelled`].
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_reason: Option<String>,
}

impl RecurringPayment {
    pub fn is_cancelled(&self) -> bool {
        self.status.id == PaymentStatusType::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_status_keeps_reserved_values() {
        let status: PaymentStatus =
            serde_json::from_value(json!({"id": 3, "description": "?"})).unwrap();
        assert_eq!(status.id, PaymentStatusType::Reserved3);

        let status: PaymentStatus = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(status.id, PaymentStatusType::Other(42));
        assert_eq!(serde_json::to_value(&status).unwrap()["id"], json!(42));
    }

    #[test]
    fn test_payment_sequence_keeps_undocumented_values() {
        let sequence: PaymentSequence = serde_json::from_value(json!("first")).unwrap();
        assert_eq!(sequence, PaymentSequence::First);

        let sequence: PaymentSequence = serde_json::from_value(json!("renewal")).unwrap();
        assert_eq!(sequence, PaymentSequence::Other("renewal".to_string()));
        assert_eq!(serde_json::to_value(&sequence).unwrap(), json!("renewal"));
    }

    #[test]
    fn test_full_payment_decodes() {
        let payment: Payment = serde_json::from_value(json!({
            "transaction_id": "tbx-26929434a22570-14ea1b",
            "status": {"id": 1, "description": "Complete"},
            "payment_sequence": "oneoff",
            "created_at": "2024-04-16T15:21:22.000000Z",
            "price": {"amount": 1.4, "currency": "GBP"},
            "price_paid": {"amount": 1.4, "currency": "GBP"},
            "payment_method": {"name": "Test Payments", "refundable": true},
            "fees": {
                "tax": {"amount": 0, "currency": "GBP"},
                "gateway": {"amount": 0.12, "currency": "GBP"}
            },
            "customer": {
                "first_name": "Tebex",
                "last_name": "Integrations",
                "email": "integrations@tebex.io",
                "ip": "127.0.0.1",
                "username": {"id": "f0b96d6e8ca94e1c9e0f6c72e80a4c6b", "username": "Notch"},
                "marketing_consent": false,
                "country": "GB",
                "postal_code": "SW1A 1AA"
            },
            "products": [{
                "id": 6010312,
                "name": "VIP",
                "quantity": 1,
                "base_price": {"amount": 1.4, "currency": "GBP"},
                "paid_price": {"amount": 1.4, "currency": "GBP"},
                "variables": [{"identifier": "color", "option": "red"}],
                "expires_at": null,
                "custom": null,
                "username": {"id": "f0b96d6e8ca94e1c9e0f6c72e80a4c6b", "username": "Notch"}
            }],
            "coupons": [],
            "gift_cards": [],
            "recurring_payment_reference": null,
            "decline_reason": null
        }))
        .unwrap();

        assert_eq!(payment.status.id, PaymentStatusType::Complete);
        assert_eq!(payment.customer.username.username, "Notch");
        assert_eq!(payment.fees["gateway"].amount, 0.12);
        assert_eq!(payment.products[0].variables[0].option, "red");
        assert!(payment.decline_reason.is_none());
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let payment: Payment = serde_json::from_value(json!({
            "transaction_id": "tx_1",
            "status": null,
            "payment_sequence": null,
            "created_at": null,
            "price": {"amount": null, "currency": "USD"},
            "fees": null,
            "customer": {
                "email": "a@b.c",
                "first_name": null,
                "username": null,
                "marketing_consent": null,
                "postal_code": null
            },
            "products": [{
                "id": 7,
                "name": null,
                "quantity": null,
                "base_price": null,
                "variables": null,
                "username": {"id": null, "username": "steve"}
            }],
            "coupons": null,
            "gift_cards": null
        }))
        .unwrap();

        assert_eq!(payment.status, PaymentStatus::default());
        assert_eq!(payment.payment_sequence, PaymentSequence::OneOff);
        assert_eq!(payment.price.amount, 0.0);
        assert_eq!(payment.price.currency, "USD");
        assert!(payment.fees.is_empty());
        assert_eq!(payment.customer.email, "a@b.c");
        assert_eq!(payment.customer.postal_code, "");
        assert_eq!(payment.customer.username, User::default());
        assert!(!payment.customer.marketing_consent);
        assert_eq!(payment.products[0].id, 7);
        assert_eq!(payment.products[0].base_price, Price::default());
        assert!(payment.products[0].variables.is_empty());
        assert_eq!(payment.products[0].username.username, "steve");
        assert!(payment.coupons.is_empty());

        let products_null: Payment =
            serde_json::from_value(json!({"transaction_id": "tx_2", "products": null})).unwrap();
        assert!(products_null.products.is_empty());
    }

    #[test]
    fn test_null_recurring_payment_fields_fall_back_to_defaults() {
        let recurring: RecurringPayment = serde_json::from_value(json!({
            "reference": "rp_1",
            "status": null,
            "next_payment_at": null,
            "fail_count": null,
            "price": null
        }))
        .unwrap();

        assert_eq!(recurring.status.id, PaymentStatusType::Unknown0);
        assert_eq!(recurring.fail_count, 0);
        assert!(!recurring.is_cancelled());
    }

    #[test]
    fn test_payment_requires_transaction_id() {
        let result: Result<Payment, _> = serde_json::from_value(json!({"status": {"id": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_cancelled_recurring_payment() {
        let recurring: RecurringPayment = serde_json::from_value(json!({
            "reference": "tbx-r-1",
            "status": {"id": 5, "description": "Cancelled"},
            "cancelled_at": "2024-05-01T10:00:00Z",
            "cancel_reason": "Customer request"
        }))
        .unwrap();

        assert!(recurring.is_cancelled());
        assert_eq!(recurring.cancel_reason.as_deref(), Some("Customer request"));
        assert!(recurring.initial_payment.is_none());
    }
}
