//! The availability check worker.
//!
//! One check validates that the source exists in the inventory, then fans
//! out one randomized status event for the source and one for each of its
//! applications and endpoints. Checks are triggered over HTTP (spawned
//! through [`CheckDispatcher`]) or from the inbound stream (run inline by
//! the listener).

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::task::TaskTracker;

use sources::{SourceExistence, SourcesLookup, SubResourceKind};

use crate::kernel::identity::decode_account_number;
use crate::kernel::publisher::StatusPublisher;
use crate::kernel::status::ResourceType;

/// Trigger payload naming the source to check.
///
/// Older producers send `resource_id`; both spellings land in `source_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    #[serde(alias = "resource_id")]
    pub source_id: String,
}

/// Runs availability checks against the inventory and the outbound stream.
pub struct AvailabilityChecker {
    lookup: Arc<dyn SourcesLookup>,
    publisher: Arc<StatusPublisher>,
}

impl AvailabilityChecker {
    pub fn new(lookup: Arc<dyn SourcesLookup>, publisher: Arc<StatusPublisher>) -> Self {
        Self { lookup, publisher }
    }

    /// Run one availability check.
    ///
    /// Never fails the caller: a check is best-effort and every error is
    /// logged where it happens. A failed existence or sub-resource lookup
    /// ends the check; a failed publish skips that one event only.
    pub async fn check(&self, source_id: &str, x_rh_identity: &str) {
        let existence = match self.lookup.source_exists(source_id, x_rh_identity).await {
            Ok(existence) => existence,
            Err(error) => {
                tracing::error!(
                    source_id = %source_id,
                    error = %error,
                    "could not check whether the source exists"
                );
                return;
            }
        };

        if existence == SourceExistence::Absent {
            tracing::warn!(
                account_number = %decode_account_number(x_rh_identity),
                source_id = %source_id,
                "availability check requested for a source that does not exist"
            );
            return;
        }

        if let Err(error) = self
            .publisher
            .publish_status(ResourceType::Source, source_id, x_rh_identity)
            .await
        {
            tracing::error!(source_id = %source_id, error = %error, "source status publish failed");
        }

        let applications = match self
            .lookup
            .list_sub_resources(source_id, SubResourceKind::Applications, x_rh_identity)
            .await
        {
            Ok(applications) => applications,
            Err(error) => {
                tracing::error!(
                    source_id = %source_id,
                    error = %error,
                    "could not fetch the source's applications"
                );
                return;
            }
        };

        for application in &applications {
            if let Err(error) = self
                .publisher
                .publish_status(ResourceType::Application, &application.id, x_rh_identity)
                .await
            {
                tracing::error!(
                    source_id = %source_id,
                    application_id = %application.id,
                    error = %error,
                    "application status publish failed"
                );
            }
        }

        let endpoints = match self
            .lookup
            .list_sub_resources(source_id, SubResourceKind::Endpoints, x_rh_identity)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(error) => {
                tracing::error!(
                    source_id = %source_id,
                    error = %error,
                    "could not fetch the source's endpoints"
                );
                return;
            }
        };

        for endpoint in &endpoints {
            if let Err(error) = self
                .publisher
                .publish_status(ResourceType::Endpoint, &endpoint.id, x_rh_identity)
                .await
            {
                tracing::error!(
                    source_id = %source_id,
                    endpoint_id = %endpoint.id,
                    error = %error,
                    "endpoint status publish failed"
                );
            }
        }

        tracing::info!(
            source_id = %source_id,
            applications = applications.len(),
            endpoints = endpoints.len(),
            "availability check finished"
        );
    }
}

/// Fire-and-forget dispatch for HTTP-triggered checks.
///
/// Each check runs on its own tracked tokio task so the HTTP handler can
/// answer immediately while shutdown still waits for in-flight checks
/// instead of dropping them.
#[derive(Clone)]
pub struct CheckDispatcher {
    checker: Arc<AvailabilityChecker>,
    tracker: TaskTracker,
}

impl CheckDispatcher {
    pub fn new(checker: Arc<AvailabilityChecker>) -> Self {
        Self {
            checker,
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn one check. The caller never learns the outcome.
    pub fn dispatch(&self, source_id: String, x_rh_identity: String) {
        let checker = self.checker.clone();
        self.tracker.spawn(async move {
            checker.check(&source_id, &x_rh_identity).await;
        });
    }

    /// Stop tracking new checks and wait for the in-flight ones to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::nats::{NatsPublisher, TestNats};
    use crate::kernel::publisher::STATUS_SUBJECT;
    use crate::kernel::status::{FixedDice, StatusEvent, StatusGenerator};
    use sources::testing::MockSourcesApi;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn checker_with(mock: MockSourcesApi, nats: Arc<TestNats>) -> AvailabilityChecker {
        let publisher = Arc::new(StatusPublisher::new(
            nats,
            StatusGenerator::new(Arc::new(FixedDice { status: 0, error: 0 })),
        ));
        AvailabilityChecker::new(Arc::new(mock), publisher)
    }

    fn resource_types(nats: &TestNats) -> Vec<ResourceType> {
        nats.published_messages()
            .iter()
            .map(|msg| {
                nats.deserialize_message::<StatusEvent>(msg)
                    .unwrap()
                    .resource_type
            })
            .collect()
    }

    #[tokio::test]
    async fn fans_out_over_source_applications_and_endpoints() {
        let mock = MockSourcesApi::new()
            .with_source("1")
            .with_applications("1", &["101", "102"])
            .with_endpoints("1", &["201"]);
        let nats = Arc::new(TestNats::new());

        checker_with(mock, nats.clone())
            .check("1", &crate::kernel::identity::encode_identity("12345"))
            .await;

        assert_eq!(nats.publish_count_for(STATUS_SUBJECT), 4);
        assert_eq!(
            resource_types(&nats),
            vec![
                ResourceType::Source,
                ResourceType::Application,
                ResourceType::Application,
                ResourceType::Endpoint,
            ]
        );
    }

    #[tokio::test]
    async fn absent_source_publishes_nothing() {
        let mock = MockSourcesApi::new().with_absent_source("404");
        let nats = Arc::new(TestNats::new());
        let checker = checker_with(mock, nats.clone());

        checker.check("404", "dGVzdA==").await;

        assert_eq!(nats.publish_count(), 0);
    }

    #[tokio::test]
    async fn indeterminate_existence_publishes_nothing() {
        // An unconfigured source makes the mock fail the existence lookup.
        let mock = MockSourcesApi::new();
        let nats = Arc::new(TestNats::new());

        checker_with(mock, nats.clone()).check("1", "dGVzdA==").await;

        assert_eq!(nats.publish_count(), 0);
    }

    #[tokio::test]
    async fn failed_application_listing_stops_before_endpoints() {
        let mock = MockSourcesApi::new()
            .with_source("1")
            .with_failing_list("1", SubResourceKind::Applications)
            .with_endpoints("1", &["201"]);
        let nats = Arc::new(TestNats::new());
        let lookup = Arc::new(mock);

        let publisher = Arc::new(StatusPublisher::new(
            nats.clone(),
            StatusGenerator::new(Arc::new(FixedDice { status: 0, error: 0 })),
        ));
        let checker = AvailabilityChecker::new(lookup.clone(), publisher);

        checker.check("1", "dGVzdA==").await;

        // Only the source event went out, and the endpoint listing was never
        // attempted.
        assert_eq!(resource_types(&nats), vec![ResourceType::Source]);
        assert_eq!(
            lookup.list_calls(),
            vec![("1".to_string(), SubResourceKind::Applications)]
        );
    }

    #[tokio::test]
    async fn publish_failures_do_not_stop_the_fan_out() {
        struct CountingFailNats {
            attempts: AtomicUsize,
        }

        #[async_trait::async_trait]
        impl NatsPublisher for CountingFailNats {
            async fn publish(
                &self,
                _subject: String,
                _headers: async_nats::HeaderMap,
                _payload: bytes::Bytes,
            ) -> anyhow::Result<()> {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("broker unavailable")
            }
        }

        let mock = MockSourcesApi::new()
            .with_source("1")
            .with_applications("1", &["101", "102"])
            .with_endpoints("1", &["201"]);
        let nats = Arc::new(CountingFailNats {
            attempts: AtomicUsize::new(0),
        });
        let publisher = Arc::new(StatusPublisher::new(
            nats.clone(),
            StatusGenerator::new(Arc::new(FixedDice { status: 0, error: 0 })),
        ));

        AvailabilityChecker::new(Arc::new(mock), publisher)
            .check("1", "dGVzdA==")
            .await;

        assert_eq!(nats.attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn dispatcher_runs_checks_to_completion_before_shutdown_returns() {
        let mock = MockSourcesApi::new()
            .with_source("1")
            .with_applications("1", &["101"])
            .with_endpoints("1", &["201"]);
        let nats = Arc::new(TestNats::new());
        let dispatcher = CheckDispatcher::new(Arc::new(checker_with(mock, nats.clone())));

        dispatcher.dispatch("1".to_string(), "dGVzdA==".to_string());
        dispatcher.shutdown().await;

        assert_eq!(nats.publish_count(), 3);
    }
}
