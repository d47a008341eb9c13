use colored::*;
use std::time::Duration;

use crate::webhook_client::Delivery;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn print_delivery(delivery: &Delivery) {
    let status = if delivery.status < 300 {
        delivery.status.to_string().green()
    } else {
        delivery.status.to_string().yellow()
    };

    println!("{} Receiver answered {}", "←".blue(), status.bold());

    if delivery.body.is_empty() {
        return;
    }
    match serde_json::from_str::<serde_json::Value>(&delivery.body) {
        Ok(json) => {
            if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                println!("   {}", pretty.dimmed());
            }
        }
        Err(_) => println!("   {}", delivery.body.dimmed()),
    }
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}
