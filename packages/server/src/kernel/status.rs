//! Status event model and randomized generation.
//!
//! Every check ends in a batch of [`StatusEvent`]s, one per resource. The
//! status and the error message attached to degraded statuses are drawn at
//! random; [`StatusDice`] is the seam that lets tests pin the draw.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Resource kinds a status event can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Source,
    Application,
    Endpoint,
    Health,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Source => "Source",
            ResourceType::Application => "Application",
            ResourceType::Endpoint => "Endpoint",
            ResourceType::Health => "Health",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Availability statuses, in the order the dice index selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    InProgress,
    PartiallyAvailable,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::InProgress => "in_progress",
            AvailabilityStatus::PartiallyAvailable => "partially_available",
            AvailabilityStatus::Unavailable => "unavailable",
        }
    }

    /// Degraded statuses carry an error message on the wire.
    pub fn is_degraded(self) -> bool {
        matches!(
            self,
            AvailabilityStatus::PartiallyAvailable | AvailabilityStatus::Unavailable
        )
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draw table for statuses.
pub const AVAILABILITY_STATUSES: [AvailabilityStatus; 4] = [
    AvailabilityStatus::Available,
    AvailabilityStatus::InProgress,
    AvailabilityStatus::PartiallyAvailable,
    AvailabilityStatus::Unavailable,
];

/// Draw table for the error message attached to degraded statuses.
pub const ERROR_MESSAGES: [&str; 8] = [
    "network error",
    "could not reach the resource",
    "internal resource error",
    "database not connected",
    "insufficient permissions",
    "not authorized",
    "missing required headers for authentication",
    "invalid uri provided",
];

/// One availability status event, as serialized for downstream consumers.
///
/// `error` is the empty string for healthy statuses and is always present in
/// the serialized form; consumers key off the field existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub status: AvailabilityStatus,
    pub error: String,
}

/// Index source for status draws.
///
/// The contract is uniform indices over the full tables: `status_index` in
/// `[0, 4)` and `error_index` in `[0, 8)`.
pub trait StatusDice: Send + Sync {
    fn status_index(&self) -> usize;
    fn error_index(&self) -> usize;
}

/// Thread-local `fastrand` draws. The production dice.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastrandDice;

impl StatusDice for FastrandDice {
    fn status_index(&self) -> usize {
        fastrand::usize(0..AVAILABILITY_STATUSES.len())
    }

    fn error_index(&self) -> usize {
        fastrand::usize(0..ERROR_MESSAGES.len())
    }
}

/// Pinned draws for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedDice {
    pub status: usize,
    pub error: usize,
}

impl StatusDice for FixedDice {
    fn status_index(&self) -> usize {
        self.status
    }

    fn error_index(&self) -> usize {
        self.error
    }
}

/// Builds randomized status events from a set of dice.
pub struct StatusGenerator {
    dice: Arc<dyn StatusDice>,
}

impl StatusGenerator {
    pub fn new(dice: Arc<dyn StatusDice>) -> Self {
        Self { dice }
    }

    /// Draw a status for the resource. The error message is drawn only when
    /// the status is degraded; otherwise the event carries an empty string.
    pub fn generate(&self, resource_type: ResourceType, resource_id: &str) -> StatusEvent {
        let status = AVAILABILITY_STATUSES[self.dice.status_index()];
        let error = if status.is_degraded() {
            ERROR_MESSAGES[self.dice.error_index()].to_string()
        } else {
            String::new()
        };

        StatusEvent {
            resource_type,
            resource_id: resource_id.to_string(),
            status,
            error,
        }
    }
}

impl Default for StatusGenerator {
    fn default() -> Self {
        Self::new(Arc::new(FastrandDice))
    }
}
