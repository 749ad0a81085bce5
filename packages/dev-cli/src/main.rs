// Developer CLI for poking a running availability status simulator.
//
// `dev check 1` fires the HTTP trigger, `dev request 1` publishes a stream
// trigger, `dev listen` tails the status subject and pretty-prints what the
// simulator emits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;

use server_core::kernel::{
    encode_identity, AvailabilityStatus, StatusEvent, CHECK_REQUESTS_SUBJECT, STATUS_SUBJECT,
    X_RH_IDENTITY,
};

#[derive(Parser)]
#[command(name = "dev")]
#[command(about = "Poke a running availability status simulator", version)]
struct Cli {
    /// Base URL of the simulator's HTTP trigger
    #[arg(long, global = true, default_value = "http://localhost:10000")]
    url: String,

    /// NATS server address
    #[arg(long, global = true, default_value = "nats://localhost:4222")]
    nats: String,

    /// Account number encoded into the x-rh-identity header
    #[arg(long, global = true, default_value = "12345")]
    account: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire an availability check over HTTP
    Check {
        /// Source id to check
        source_id: String,
    },
    /// Publish an availability check request onto the stream
    Request {
        /// Source id to check
        source_id: String,
    },
    /// Probe the simulator's health endpoint
    Health,
    /// Tail the status subject and print every event
    Listen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check { source_id } => check(&cli.url, &cli.account, source_id).await,
        Commands::Request { source_id } => request(&cli.nats, &cli.account, source_id).await,
        Commands::Health => health(&cli.url).await,
        Commands::Listen => listen(&cli.nats).await,
    }
}

async fn check(url: &str, account: &str, source_id: &str) -> Result<()> {
    let response = reqwest::Client::new()
        .post(format!("{url}/availability_check"))
        .header(X_RH_IDENTITY, encode_identity(account))
        .json(&serde_json::json!({ "source_id": source_id }))
        .send()
        .await
        .context("Failed to reach the simulator")?;

    if response.status() == reqwest::StatusCode::ACCEPTED {
        println!(
            "{} check dispatched for source {}",
            "✓".bright_green(),
            source_id.bright_yellow()
        );
        println!("  {}", "watch results with `dev listen`".dimmed());
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        println!("{} simulator answered {}: {}", "✗".bright_red(), status, body);
    }

    Ok(())
}

async fn request(nats_url: &str, account: &str, source_id: &str) -> Result<()> {
    let client = async_nats::connect(nats_url)
        .await
        .context("Failed to connect to NATS")?;

    let mut headers = async_nats::HeaderMap::new();
    headers.insert(X_RH_IDENTITY, encode_identity(account));

    let payload = serde_json::to_vec(&serde_json::json!({ "source_id": source_id }))?;
    client
        .publish_with_headers(CHECK_REQUESTS_SUBJECT, headers, payload.into())
        .await
        .context("Failed to publish the check request")?;
    client.flush().await.context("Failed to flush NATS")?;

    println!(
        "{} check request published to {}",
        "✓".bright_green(),
        CHECK_REQUESTS_SUBJECT.bright_yellow()
    );

    Ok(())
}

async fn health(url: &str) -> Result<()> {
    let response = reqwest::get(format!("{url}/health"))
        .await
        .context("Failed to reach the simulator")?;

    if response.status().is_success() {
        println!("{} simulator is healthy", "✓".bright_green());
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        println!("{} simulator is unhealthy ({status}): {body}", "✗".bright_red());
    }

    Ok(())
}

async fn listen(nats_url: &str) -> Result<()> {
    let client = async_nats::connect(nats_url)
        .await
        .context("Failed to connect to NATS")?;
    let mut subscription = client
        .subscribe(STATUS_SUBJECT)
        .await
        .context("Failed to subscribe to the status subject")?;

    println!(
        "{} listening on {}",
        "▶".bright_cyan(),
        STATUS_SUBJECT.bright_yellow()
    );
    println!("  {}", "Press Ctrl+C to stop".dimmed());
    println!();

    while let Some(message) = subscription.next().await {
        match serde_json::from_slice::<StatusEvent>(&message.payload) {
            Ok(event) => {
                let line = format!(
                    "{} {} {}",
                    event.resource_type.to_string().bright_blue(),
                    event.resource_id.bright_yellow(),
                    colorize_status(event.status),
                );
                if event.error.is_empty() {
                    println!("{line}");
                } else {
                    println!("{line} {}", format!("({})", event.error).dimmed());
                }
            }
            Err(_) => {
                println!(
                    "{} undecodable payload on {}",
                    "?".bright_red(),
                    message.subject
                );
            }
        }
    }

    Ok(())
}

fn colorize_status(status: AvailabilityStatus) -> colored::ColoredString {
    match status {
        AvailabilityStatus::Available => status.as_str().bright_green(),
        AvailabilityStatus::InProgress => status.as_str().bright_blue(),
        AvailabilityStatus::PartiallyAvailable => status.as_str().bright_yellow(),
        AvailabilityStatus::Unavailable => status.as_str().bright_red(),
    }
}
