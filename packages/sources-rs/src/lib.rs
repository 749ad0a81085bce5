//! Client library for the sources-api inventory service.
//!
//! The simulator only needs three operations from the inventory: check that a
//! source exists, enumerate the sub-resources (applications, endpoints) that
//! hang off it, and probe the service's health endpoint. This crate wraps
//! those calls behind the [`SourcesLookup`] trait so the server can swap the
//! real HTTP client for [`testing::MockSourcesApi`] in tests.
//!
//! # Modules
//!
//! - [`client`] - `SourcesClient`, the reqwest-backed implementation
//! - [`models`] - wire shapes and lookup outcomes
//! - [`error`] - typed lookup errors
//! - [`testing`] - builder-style mock for tests

pub mod client;
pub mod error;
pub mod models;
pub mod testing;

use async_trait::async_trait;

pub use client::{SourcesClient, SourcesOptions};
pub use error::LookupError;
pub use models::{SourceExistence, SubResourceId, SubResourceKind};

/// Name of the identity header carried on every request to the inventory and
/// forwarded verbatim on every published status event.
pub const X_RH_IDENTITY: &str = "x-rh-identity";

/// Lookup operations against the sources-api inventory.
///
/// All operations forward the caller's identity header untouched; the
/// inventory uses it for tenancy, this crate never inspects it.
#[async_trait]
pub trait SourcesLookup: Send + Sync {
    /// Check whether a source exists.
    ///
    /// A 200 from the inventory confirms presence, a 404 confirms absence.
    /// Any other status or a transport failure is an error, which keeps
    /// "confirmed absent" distinguishable from "could not determine".
    async fn source_exists(
        &self,
        source_id: &str,
        x_rh_identity: &str,
    ) -> Result<SourceExistence, LookupError>;

    /// List the ids of the sub-resources of `kind` belonging to a source.
    async fn list_sub_resources(
        &self,
        source_id: &str,
        kind: SubResourceKind,
        x_rh_identity: &str,
    ) -> Result<Vec<SubResourceId>, LookupError>;

    /// Probe the inventory's health endpoint.
    async fn health(&self) -> Result<(), LookupError>;
}
