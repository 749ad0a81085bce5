//! Stream trigger path: a NATS listener that turns check-request messages
//! into availability checks.
//!
//! Messages are handled one at a time, in arrival order. A dropped
//! subscription or a failed subscribe does not end the listener; it
//! re-subscribes with exponential backoff and keeps going until shutdown.

use std::sync::Arc;
use std::time::Duration;

use async_nats::HeaderMap;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use sources::X_RH_IDENTITY;

use crate::kernel::checker::{AvailabilityChecker, CheckRequest};

/// Subject the simulator subscribes to for check requests.
pub const CHECK_REQUESTS_SUBJECT: &str = "platform.sources.availability-requests";

/// Tuning for the subscribe loop.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub subject: String,
    /// Delay before the first re-subscribe attempt.
    pub min_backoff: Duration,
    /// The backoff doubles per failed attempt up to this cap.
    pub max_backoff: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            subject: CHECK_REQUESTS_SUBJECT.to_string(),
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Sequential consumer of availability check requests.
pub struct CheckRequestListener {
    client: async_nats::Client,
    checker: Arc<AvailabilityChecker>,
    config: ListenerConfig,
}

impl CheckRequestListener {
    pub fn new(client: async_nats::Client, checker: Arc<AvailabilityChecker>) -> Self {
        Self::with_config(client, checker, ListenerConfig::default())
    }

    pub fn with_config(
        client: async_nats::Client,
        checker: Arc<AvailabilityChecker>,
        config: ListenerConfig,
    ) -> Self {
        Self {
            client,
            checker,
            config,
        }
    }

    /// Run until `shutdown` fires. A message in flight finishes its check
    /// before the loop notices the cancellation.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut backoff = self.config.min_backoff;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let mut subscription = tokio::select! {
                _ = shutdown.cancelled() => break,
                subscribed = self.client.subscribe(self.config.subject.clone()) => {
                    match subscribed {
                        Ok(subscription) => subscription,
                        Err(error) => {
                            tracing::error!(
                                subject = %self.config.subject,
                                error = %error,
                                retry_in_ms = backoff.as_millis() as u64,
                                "could not subscribe for check requests"
                            );
                            tokio::select! {
                                _ = shutdown.cancelled() => break,
                                _ = tokio::time::sleep(backoff) => {}
                            }
                            backoff = (backoff * 2).min(self.config.max_backoff);
                            continue;
                        }
                    }
                }
            };

            tracing::info!(subject = %self.config.subject, "listening for availability check requests");
            backoff = self.config.min_backoff;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("check request listener stopping");
                        return;
                    }
                    message = subscription.next() => match message {
                        Some(message) => {
                            handle_message(&self.checker, message.headers.as_ref(), &message.payload)
                                .await;
                        }
                        None => {
                            tracing::warn!(
                                subject = %self.config.subject,
                                retry_in_ms = backoff.as_millis() as u64,
                                "check request subscription ended, resubscribing"
                            );
                            break;
                        }
                    }
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(self.config.max_backoff);
        }

        tracing::info!("check request listener stopped");
    }
}

/// Decode one trigger message and run its check inline.
///
/// Bad messages are logged and skipped; the listener never dies over input.
async fn handle_message(
    checker: &AvailabilityChecker,
    headers: Option<&HeaderMap>,
    payload: &[u8],
) {
    let x_rh_identity = headers
        .and_then(|headers| headers.get(X_RH_IDENTITY))
        .map(|value| value.as_str())
        .unwrap_or_default();

    if x_rh_identity.is_empty() {
        tracing::warn!("skipping a check request without an x-rh-identity header");
        return;
    }

    let request: CheckRequest = match serde_json::from_slice(payload) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(error = %error, "skipping a check request with an undecodable body");
            return;
        }
    };

    checker.check(&request.source_id, x_rh_identity).await;
}
