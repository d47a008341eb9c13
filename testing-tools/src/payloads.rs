//! Sample Tebex deliveries shaped like the ones the store sends.

use serde_json::{json, Value};
use uuid::Uuid;

/// A fresh event id, so repeated runs never collide in receiver logs.
pub fn event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}

fn envelope(id: &str, event_type: &str, subject: Value) -> Vec<u8> {
    let envelope = json!({
        "id": id,
        "type": event_type,
        "date": "2024-01-01T12:00:00Z",
        "subject": subject,
    });
    // Serializing a `Value` cannot fail.
    serde_json::to_vec(&envelope).unwrap_or_default()
}

pub fn payment_completed(id: &str) -> Vec<u8> {
    envelope(
        id,
        "payment.completed",
        json!({
            "transaction_id": "tbx-26929434a22414-2b5e64",
            "status": {"id": 1, "description": "Complete"},
            "payment_sequence": "oneoff",
            "created_at": "2024-01-01T11:59:58Z",
            "price": {"amount": 9.99, "currency": "USD"},
            "price_paid": {"amount": 9.99, "currency": "USD"},
            "payment_method": {"name": "PayPal", "refundable": true},
            "fees": {
                "tax": {"amount": 0.0, "currency": "USD"},
                "gateway": {"amount": 0.59, "currency": "USD"}
            },
            "customer": {
                "first_name": "Alex",
                "last_name": "Player",
                "email": "alex@example.com",
                "ip": "203.0.113.10",
                "username": {"id": "2d3bbd6f3f2b4b1e", "username": "alexplays"},
                "marketing_consent": false,
                "country": "US",
                "postal_code": "10001"
            },
            "products": [{
                "id": 5491212,
                "name": "VIP Rank",
                "quantity": 1,
                "base_price": {"amount": 9.99, "currency": "USD"},
                "paid_price": {"amount": 9.99, "currency": "USD"},
                "variables": [],
                "expires_at": null,
                "custom": null,
                "username": {"id": "2d3bbd6f3f2b4b1e", "username": "alexplays"}
            }],
            "coupons": [],
            "gift_cards": [],
            "recurring_payment_reference": null
        }),
    )
}

pub fn validation(id: &str) -> Vec<u8> {
    envelope(id, "validation.webhook", Value::Null)
}

pub fn unknown_event_type(id: &str) -> Vec<u8> {
    envelope(id, "foo.bar", json!({}))
}
