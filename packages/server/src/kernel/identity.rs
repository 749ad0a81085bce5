//! Decoding of the `x-rh-identity` header.
//!
//! The header is a base64-encoded JSON envelope. The simulator only ever
//! reads the account number out of it, and only for log context, so every
//! decode failure degrades to an empty string instead of an error.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct IdentityEnvelope {
    identity: Identity,
}

#[derive(Debug, Deserialize)]
struct Identity {
    #[serde(default)]
    account_number: String,
}

/// Extract the account number from an `x-rh-identity` header value.
///
/// Returns an empty string when the header is not valid base64, not valid
/// JSON, or has no account number.
pub fn decode_account_number(x_rh_identity: &str) -> String {
    let contents = match STANDARD.decode(x_rh_identity) {
        Ok(contents) => contents,
        Err(error) => {
            tracing::debug!(error = %error, "could not base64-decode the x-rh-identity header");
            return String::new();
        }
    };

    match serde_json::from_slice::<IdentityEnvelope>(&contents) {
        Ok(envelope) => envelope.identity.account_number,
        Err(error) => {
            tracing::debug!(error = %error, "could not read an account number out of the x-rh-identity header");
            String::new()
        }
    }
}

/// Build an `x-rh-identity` header value for an account number.
///
/// The simulator forwards headers it receives rather than minting them; this
/// exists for the dev CLI and for tests.
pub fn encode_identity(account_number: &str) -> String {
    let envelope = serde_json::json!({ "identity": { "account_number": account_number } });
    STANDARD.encode(envelope.to_string())
}
