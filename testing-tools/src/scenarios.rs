use anyhow::Result;
use colored::*;
use serde_json::json;
use std::time::Instant;

use crate::output::{print_delivery, TestResult};
use crate::payloads;
use crate::webhook_client::{Delivery, WebhookClient};

fn check(
    scenario: &str,
    start: Instant,
    delivery: &Delivery,
    expected_status: u16,
    expected_body: Option<serde_json::Value>,
) -> TestResult {
    print_delivery(delivery);

    let mut failures = Vec::new();
    if delivery.status != expected_status {
        failures.push(format!(
            "Expected status {expected_status}, got {}",
            delivery.status
        ));
    }
    if let Some(expected) = expected_body {
        if delivery.json().as_ref() != Some(&expected) {
            failures.push(format!("Expected body {expected}, got {}", delivery.body));
        }
    }

    if failures.is_empty() {
        println!("{} Response verified", "✓".green());
    } else {
        println!("{} Unexpected response", "✗".red());
    }

    TestResult {
        scenario: scenario.to_string(),
        passed: failures.is_empty(),
        message: (!failures.is_empty()).then(|| failures.join("; ")),
        duration: start.elapsed(),
    }
}

pub async fn test_valid_payment(client: &WebhookClient) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Valid Payment ===".bright_cyan().bold());

    let id = payloads::event_id();
    println!("{} Delivering signed payment.completed {}...", "→".blue(), id);
    let delivery = client.deliver(payloads::payment_completed(&id)).await?;

    Ok(check(
        "valid_payment",
        start,
        &delivery,
        200,
        Some(json!({"status": "ok"})),
    ))
}

pub async fn test_bad_signature(client: &WebhookClient) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Bad Signature ===".bright_cyan().bold());

    let id = payloads::event_id();
    println!("{} Delivering payment with a forged signature...", "→".blue());
    let delivery = client
        .send(payloads::payment_completed(&id), "application/json", "deadbeef")
        .await?;

    Ok(check("bad_signature", start, &delivery, 401, None))
}

pub async fn test_wrong_content_type(client: &WebhookClient) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Wrong Content Type ===".bright_cyan().bold());

    let id = payloads::event_id();
    let body = payloads::payment_completed(&id);
    let signature = client.sign(&body)?;
    println!("{} Delivering payment as text/plain...", "→".blue());
    let delivery = client.send(body, "text/plain", &signature).await?;

    Ok(check("wrong_content_type", start, &delivery, 415, None))
}

pub async fn test_unknown_event_type(client: &WebhookClient) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Unknown Event Type ===".bright_cyan().bold());

    let id = payloads::event_id();
    println!("{} Delivering signed foo.bar event...", "→".blue());
    let delivery = client.deliver(payloads::unknown_event_type(&id)).await?;

    Ok(check("unknown_event_type", start, &delivery, 400, None))
}

pub async fn test_validation_handshake(client: &WebhookClient) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Validation Handshake ===".bright_cyan().bold());

    let id = payloads::event_id();
    println!("{} Delivering validation.webhook {}...", "→".blue(), id);
    let delivery = client.deliver(payloads::validation(&id)).await?;

    Ok(check(
        "validation_handshake",
        start,
        &delivery,
        200,
        Some(json!({"id": id})),
    ))
}
