// Main entry point for the availability status simulator

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::kernel::{
    AvailabilityChecker, CheckDispatcher, CheckRequestListener, NatsClientPublisher, ServerDeps,
    StatusGenerator, StatusPublisher,
};
use server_core::server::build_app;
use server_core::Config;
use sources::{SourcesClient, SourcesOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Availability Status Simulator");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to NATS
    tracing::info!(url = %config.queue_url, "Connecting to NATS...");
    let nats = async_nats::connect(config.queue_url.as_str())
        .await
        .context("Failed to connect to NATS")?;
    tracing::info!("NATS connected");

    // Build the dependency graph: inventory client, event publisher, checker
    let lookup = Arc::new(
        SourcesClient::new(SourcesOptions {
            api_url: config.sources_api_url.clone(),
            health_url: config.sources_api_health_url.clone(),
        })
        .context("Failed to build the sources-api client")?,
    );
    let publisher = Arc::new(StatusPublisher::new(
        Arc::new(NatsClientPublisher::new(nats.clone())),
        StatusGenerator::default(),
    ));
    let checker = Arc::new(AvailabilityChecker::new(lookup.clone(), publisher.clone()));
    let dispatcher = CheckDispatcher::new(checker.clone());
    let deps = Arc::new(ServerDeps::new(lookup, publisher, dispatcher.clone()));

    let shutdown = CancellationToken::new();

    // Stream trigger path: one sequential listener loop
    let listener_task = tokio::spawn(CheckRequestListener::new(nats, checker).run(shutdown.clone()));

    // Translate Ctrl-C into a cancellation for every loop in the process
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::error!("could not install the shutdown signal handler");
            }
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        });
    }

    // Build application
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("Server error")?;

    // HTTP is down; wait for the stream listener, then drain spawned checks
    listener_task.await.context("Listener task panicked")?;
    dispatcher.shutdown().await;
    tracing::info!("In-flight checks drained, shutting down");

    Ok(())
}
