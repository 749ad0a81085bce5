//! Builder-style mock of the inventory for tests.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::LookupError;
use crate::models::{SourceExistence, SubResourceId, SubResourceKind};
use crate::SourcesLookup;

/// In-memory [`SourcesLookup`] that answers from configured fixtures.
///
/// Unconfigured source ids fail with an unexpected-status error, which stands
/// in for "the inventory could not be consulted". List calls are recorded so
/// tests can assert which lookups actually happened.
#[derive(Default)]
pub struct MockSourcesApi {
    sources: RwLock<HashMap<String, SourceExistence>>,
    applications: RwLock<HashMap<String, Vec<SubResourceId>>>,
    endpoints: RwLock<HashMap<String, Vec<SubResourceId>>>,
    failing_lists: RwLock<HashSet<(String, SubResourceKind)>>,
    unhealthy: RwLock<bool>,
    list_calls: RwLock<Vec<(String, SubResourceKind)>>,
}

impl MockSourcesApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source the inventory confirms as present.
    pub fn with_source(self, source_id: &str) -> Self {
        self.sources
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source_id.to_string(), SourceExistence::Present);
        self
    }

    /// Register a source the inventory confirms as absent (404).
    pub fn with_absent_source(self, source_id: &str) -> Self {
        self.sources
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source_id.to_string(), SourceExistence::Absent);
        self
    }

    /// Set the application ids returned for a source.
    pub fn with_applications(self, source_id: &str, ids: &[&str]) -> Self {
        self.applications
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source_id.to_string(), to_sub_resources(ids));
        self
    }

    /// Set the endpoint ids returned for a source.
    pub fn with_endpoints(self, source_id: &str, ids: &[&str]) -> Self {
        self.endpoints
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source_id.to_string(), to_sub_resources(ids));
        self
    }

    /// Make one list operation fail with an unexpected-status error.
    pub fn with_failing_list(self, source_id: &str, kind: SubResourceKind) -> Self {
        self.failing_lists
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((source_id.to_string(), kind));
        self
    }

    /// Make the health probe fail.
    pub fn with_unhealthy(self) -> Self {
        *self.unhealthy.write().unwrap_or_else(|e| e.into_inner()) = true;
        self
    }

    /// Every `list_sub_resources` call seen so far, in order.
    pub fn list_calls(&self) -> Vec<(String, SubResourceKind)> {
        self.list_calls
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn to_sub_resources(ids: &[&str]) -> Vec<SubResourceId> {
    ids.iter()
        .map(|id| SubResourceId { id: id.to_string() })
        .collect()
}

#[async_trait]
impl SourcesLookup for MockSourcesApi {
    async fn source_exists(
        &self,
        source_id: &str,
        _x_rh_identity: &str,
    ) -> Result<SourceExistence, LookupError> {
        self.sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(source_id)
            .copied()
            .ok_or_else(|| LookupError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                path: format!("/sources/{source_id}"),
            })
    }

    async fn list_sub_resources(
        &self,
        source_id: &str,
        kind: SubResourceKind,
        _x_rh_identity: &str,
    ) -> Result<Vec<SubResourceId>, LookupError> {
        self.list_calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((source_id.to_string(), kind));

        let failing = self
            .failing_lists
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(source_id.to_string(), kind));
        if failing {
            return Err(LookupError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                path: format!("/sources/{source_id}/{kind}"),
            });
        }

        let map = match kind {
            SubResourceKind::Applications => &self.applications,
            SubResourceKind::Endpoints => &self.endpoints,
        };

        Ok(map
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(source_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn health(&self) -> Result<(), LookupError> {
        if *self.unhealthy.read().unwrap_or_else(|e| e.into_inner()) {
            return Err(LookupError::UnexpectedStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                path: "/health".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_source_is_found() {
        let mock = MockSourcesApi::new().with_source("1");
        let existence = mock.source_exists("1", "token").await.unwrap();
        assert_eq!(existence, SourceExistence::Present);
    }

    #[tokio::test]
    async fn test_unconfigured_source_is_an_error() {
        let mock = MockSourcesApi::new();
        assert!(mock.source_exists("ghost", "token").await.is_err());
    }

    #[tokio::test]
    async fn test_list_records_calls() {
        let mock = MockSourcesApi::new().with_applications("1", &["101"]);

        let apps = mock
            .list_sub_resources("1", SubResourceKind::Applications, "token")
            .await
            .unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(
            mock.list_calls(),
            vec![("1".to_string(), SubResourceKind::Applications)]
        );
    }

    #[tokio::test]
    async fn test_failing_list() {
        let mock = MockSourcesApi::new()
            .with_source("1")
            .with_failing_list("1", SubResourceKind::Endpoints);

        let err = mock
            .list_sub_resources("1", SubResourceKind::Endpoints, "token")
            .await
            .unwrap_err();
        assert!(err.is_unexpected_status());
    }
}
