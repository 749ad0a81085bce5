//! Status event publishing.
//!
//! [`StatusPublisher`] is the single path onto the outbound stream: it draws
//! an event from the generator, serializes it, and publishes it with the
//! routing headers downstream consumers dispatch on.

use std::sync::Arc;

use async_nats::HeaderMap;
use bytes::Bytes;
use thiserror::Error;

use sources::X_RH_IDENTITY;

use crate::kernel::nats::NatsPublisher;
use crate::kernel::status::{ResourceType, StatusEvent, StatusGenerator};

/// Subject availability status events are published to.
pub const STATUS_SUBJECT: &str = "platform.sources.status";

/// Header naming the event kind; consumers dispatch on it.
pub const EVENT_TYPE_HEADER: &str = "event_type";

/// The event kind stamped on every status event.
pub const AVAILABILITY_STATUS_EVENT: &str = "availability_status";

/// Errors from publishing a status event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be serialized to JSON.
    #[error("could not serialize the status event for {resource_type} \"{resource_id}\": {source}")]
    Serialize {
        resource_type: ResourceType,
        resource_id: String,
        source: serde_json::Error,
    },

    /// The stream transport refused the message.
    #[error("could not publish the status event for {resource_type} \"{resource_id}\": {cause}")]
    Transport {
        resource_type: ResourceType,
        resource_id: String,
        cause: anyhow::Error,
    },
}

/// Publishes availability status events onto the outbound stream.
pub struct StatusPublisher {
    nats: Arc<dyn NatsPublisher>,
    generator: StatusGenerator,
}

impl StatusPublisher {
    pub fn new(nats: Arc<dyn NatsPublisher>, generator: StatusGenerator) -> Self {
        Self { nats, generator }
    }

    /// Serialize one event and publish it, tagged with the event kind and the
    /// identity header of the check that produced it.
    pub async fn publish_event(
        &self,
        event: &StatusEvent,
        x_rh_identity: &str,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event).map_err(|source| PublishError::Serialize {
            resource_type: event.resource_type,
            resource_id: event.resource_id.clone(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(EVENT_TYPE_HEADER, AVAILABILITY_STATUS_EVENT);
        headers.insert(X_RH_IDENTITY, x_rh_identity);

        self.nats
            .publish(STATUS_SUBJECT.to_string(), headers, Bytes::from(payload))
            .await
            .map_err(|cause| PublishError::Transport {
                resource_type: event.resource_type,
                resource_id: event.resource_id.clone(),
                cause,
            })?;

        tracing::debug!(
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            status = %event.status,
            "status event published"
        );

        Ok(())
    }

    /// Draw a random status for the resource and publish it.
    pub async fn publish_status(
        &self,
        resource_type: ResourceType,
        resource_id: &str,
        x_rh_identity: &str,
    ) -> Result<(), PublishError> {
        let event = self.generator.generate(resource_type, resource_id);
        self.publish_event(&event, x_rh_identity).await
    }
}
