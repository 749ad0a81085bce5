use axum::{
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::kernel::{CheckRequest, X_RH_IDENTITY};
use crate::server::app::AppState;
use crate::server::routes::ErrorBody;

/// Availability check trigger endpoint
///
/// Validates the identity header and the trigger body, then answers 202
/// with the check still running in the background. The caller never learns
/// the outcome; results go out on the status stream.
pub async fn availability_check_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let x_rh_identity = headers
        .get(X_RH_IDENTITY)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if x_rh_identity.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(
                "x-rh-identity must have a base64 encoded identity header",
            )),
        )
            .into_response();
    }

    let request: CheckRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(error = %error, "could not read a source id out of the trigger body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(
                    "request body must be JSON carrying a source_id",
                )),
            )
                .into_response();
        }
    };

    state
        .deps
        .dispatcher
        .dispatch(request.source_id, x_rh_identity.to_string());

    StatusCode::ACCEPTED.into_response()
}
