// HTTP routes

pub mod availability;
pub mod health;

pub use availability::*;
pub use health::*;

use serde::Serialize;

/// JSON error body shared by the trigger and health endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
