// Availability Status Simulator - Server Core
//
// This crate fakes the availability-check side of a sources inventory:
// a check trigger arrives over HTTP or the message stream, the source is
// validated against the sources-api, and randomized availability status
// events for the source and its sub-resources go out on NATS.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
