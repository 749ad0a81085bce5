use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::kernel::ResourceType;
use crate::server::app::AppState;
use crate::server::routes::ErrorBody;

/// Resource id stamped on the synthetic health event.
const HEALTH_CHECK_RESOURCE_ID: &str = "12345";

/// The health event belongs to no tenant; consumers ignore this value.
const HEALTH_CHECK_IDENTITY: &str = "invalidXRhIdentity";

/// Health check endpoint
///
/// Checks:
/// - sources-api reachability via its health path
/// - the outbound stream, by publishing one synthetic status event
///
/// Returns 200 OK if both dependencies answer, 502 Bad Gateway naming the
/// failing side otherwise.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Response {
    if let Err(error) = state.deps.lookup.health().await {
        tracing::error!(error = %error, "sources-api health check failed");

        let body = if error.is_unexpected_status() {
            "sources-api back end returned a non 200 response code."
        } else {
            "could not perform the health check request to the sources-api back end"
        };
        return (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(body))).into_response();
    }

    if let Err(error) = state
        .deps
        .publisher
        .publish_status(
            ResourceType::Health,
            HEALTH_CHECK_RESOURCE_ID,
            HEALTH_CHECK_IDENTITY,
        )
        .await
    {
        tracing::error!(error = %error, "health check publish failed");
        return (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody::new(
                "could not perform the health check to the NATS instance",
            )),
        )
            .into_response();
    }

    StatusCode::OK.into_response()
}
