//! Kernel module - check execution, status generation, and stream plumbing
//!
//! Everything the HTTP layer and the stream listener share lives here.

pub mod checker;
pub mod deps;
pub mod identity;
pub mod listener;
pub mod nats;
pub mod publisher;
pub mod status;

pub use checker::{AvailabilityChecker, CheckDispatcher, CheckRequest};
pub use deps::ServerDeps;
pub use identity::{decode_account_number, encode_identity};
pub use listener::{CheckRequestListener, ListenerConfig, CHECK_REQUESTS_SUBJECT};
pub use nats::{NatsClientPublisher, NatsPublisher, PublishedMessage, TestNats};
pub use publisher::{
    PublishError, StatusPublisher, AVAILABILITY_STATUS_EVENT, EVENT_TYPE_HEADER, STATUS_SUBJECT,
};
pub use status::{
    AvailabilityStatus, FastrandDice, FixedDice, ResourceType, StatusDice, StatusEvent,
    StatusGenerator, AVAILABILITY_STATUSES, ERROR_MESSAGES,
};

// The identity header name comes from the sources client; re-exported so
// binaries only need the server crate.
pub use sources::X_RH_IDENTITY;
