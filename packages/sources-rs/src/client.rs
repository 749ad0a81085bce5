//! Reqwest-backed implementation of [`SourcesLookup`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::LookupError;
use crate::models::{CollectionResponse, SourceExistence, SubResourceId, SubResourceKind};
use crate::{SourcesLookup, X_RH_IDENTITY};

/// Connection settings for the inventory service.
///
/// `api_url` already includes the API version prefix
/// (e.g. `http://sources-api:8080/api/sources/v3.1`); `health_url` points at
/// the bare health endpoint.
#[derive(Debug, Clone)]
pub struct SourcesOptions {
    pub api_url: String,
    pub health_url: String,
}

/// HTTP client for the sources-api inventory.
///
/// Holds one shared `reqwest::Client`; safe to clone and to call from any
/// number of concurrent fan-out tasks.
#[derive(Debug, Clone)]
pub struct SourcesClient {
    options: SourcesOptions,
    client: reqwest::Client,
}

impl SourcesClient {
    /// Create a new client with a 30 second request timeout.
    pub fn new(options: SourcesOptions) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(LookupError::Client)?;

        Ok(Self { options, client })
    }

    fn source_path(&self, source_id: &str) -> String {
        format!("{}/sources/{}", self.options.api_url, source_id)
    }

    fn sub_resource_path(&self, source_id: &str, kind: SubResourceKind) -> String {
        format!(
            "{}/sources/{}/{}",
            self.options.api_url,
            source_id,
            kind.path_segment()
        )
    }

    async fn get(&self, path: &str, x_rh_identity: &str) -> Result<reqwest::Response, LookupError> {
        self.client
            .get(path)
            .header(X_RH_IDENTITY, x_rh_identity)
            .send()
            .await
            .map_err(|source| LookupError::Http {
                path: path.to_string(),
                source,
            })
    }
}

#[async_trait]
impl SourcesLookup for SourcesClient {
    async fn source_exists(
        &self,
        source_id: &str,
        x_rh_identity: &str,
    ) -> Result<SourceExistence, LookupError> {
        let path = self.source_path(source_id);
        let response = self.get(&path, x_rh_identity).await?;

        match response.status() {
            StatusCode::OK => Ok(SourceExistence::Present),
            StatusCode::NOT_FOUND => Ok(SourceExistence::Absent),
            status => Err(LookupError::UnexpectedStatus { status, path }),
        }
    }

    async fn list_sub_resources(
        &self,
        source_id: &str,
        kind: SubResourceKind,
        x_rh_identity: &str,
    ) -> Result<Vec<SubResourceId>, LookupError> {
        let path = self.sub_resource_path(source_id, kind);
        let response = self.get(&path, x_rh_identity).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::UnexpectedStatus { status, path });
        }

        let collection: CollectionResponse =
            response
                .json()
                .await
                .map_err(|source| LookupError::Decode { path, source })?;

        Ok(collection.data)
    }

    async fn health(&self) -> Result<(), LookupError> {
        let path = self.options.health_url.clone();
        let response = self
            .client
            .get(&path)
            .send()
            .await
            .map_err(|source| LookupError::Http {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::UnexpectedStatus { status, path });
        }

        Ok(())
    }
}
