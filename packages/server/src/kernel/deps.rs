//! Server dependencies for effects (using traits for testability)
//!
//! This module provides the central dependency container handed to the HTTP
//! layer. External services sit behind trait objects so tests can swap in
//! mocks without a broker or an inventory service.

use std::sync::Arc;

use sources::SourcesLookup;

use crate::kernel::checker::CheckDispatcher;
use crate::kernel::publisher::StatusPublisher;

/// Server dependencies accessible to handlers (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    /// Inventory lookups against the sources-api.
    pub lookup: Arc<dyn SourcesLookup>,
    /// The one path onto the outbound status stream.
    pub publisher: Arc<StatusPublisher>,
    /// Spawns HTTP-triggered checks onto tracked tasks.
    pub dispatcher: CheckDispatcher,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        lookup: Arc<dyn SourcesLookup>,
        publisher: Arc<StatusPublisher>,
        dispatcher: CheckDispatcher,
    ) -> Self {
        Self {
            lookup,
            publisher,
            dispatcher,
        }
    }
}
