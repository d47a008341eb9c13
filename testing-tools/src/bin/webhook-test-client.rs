use anyhow::Result;
use clap::Parser;
use colored::*;

use testing_tools::output::print_test_summary;
use testing_tools::scenarios;
use testing_tools::webhook_client::WebhookClient;

#[derive(Parser)]
#[command(name = "webhook-test-client")]
#[command(about = "Tebex Webhook Integration Testing Tool")]
#[command(
    long_about = "Delivers signed sample webhooks to a running receiver. Start the receiver with \
                  CHECK_SOURCE_IP=false, since deliveries from this tool do not come from a Tebex address."
)]
struct Cli {
    /// Base URL of the receiver (e.g., http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Webhook secret the receiver was started with
    #[arg(long, env = "WEBHOOK_SECRET")]
    secret: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Signed payment.completed delivery is accepted
    ValidPayment,
    /// Delivery with a forged signature is refused
    BadSignature,
    /// Signed delivery sent as text/plain is refused
    WrongContentType,
    /// Signed delivery with an unknown event type is refused
    UnknownEventType,
    /// Endpoint validation handshake echoes the event id
    ValidationHandshake,
    /// Run all tests
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());
    if cli.secret.is_empty() {
        println!(
            "{} Empty secret: the bad signature scenario only passes against a receiver that verifies signatures",
            "!".yellow()
        );
    }
    let client = WebhookClient::new(reqwest::Client::new(), &cli.base_url, cli.secret);
    println!("{} Targeting {}", "✓".green(), cli.base_url);

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ValidPayment => {
            results.push(scenarios::test_valid_payment(&client).await?);
        }
        ScenarioChoice::BadSignature => {
            results.push(scenarios::test_bad_signature(&client).await?);
        }
        ScenarioChoice::WrongContentType => {
            results.push(scenarios::test_wrong_content_type(&client).await?);
        }
        ScenarioChoice::UnknownEventType => {
            results.push(scenarios::test_unknown_event_type(&client).await?);
        }
        ScenarioChoice::ValidationHandshake => {
            results.push(scenarios::test_validation_handshake(&client).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_valid_payment(&client).await?);
            results.push(scenarios::test_bad_signature(&client).await?);
            results.push(scenarios::test_wrong_content_type(&client).await?);
            results.push(scenarios::test_unknown_event_type(&client).await?);
            results.push(scenarios::test_validation_handshake(&client).await?);
        }
    }

    // Print summary
    println!("\n{}", "=== RESULTS ===".bright_white().bold());
    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
