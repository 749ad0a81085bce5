//! Tests for `SourcesClient` against a loopback HTTP server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use sources::{
    LookupError, SourceExistence, SourcesClient, SourcesLookup, SourcesOptions, SubResourceKind,
    X_RH_IDENTITY,
};

/// Identity header value seen by the fake inventory, captured per test server.
type SeenIdentity = Arc<Mutex<Option<String>>>;

async fn source_handler(Path(id): Path<String>) -> StatusCode {
    match id.as_str() {
        "missing" => StatusCode::NOT_FOUND,
        "boom" => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

fn fake_inventory(seen: SeenIdentity) -> Router {
    Router::new()
        .route("/sources/:id", get(source_handler))
        .route(
            "/sources/:id/applications",
            get(move |Path(id): Path<String>, headers: HeaderMap| {
                let seen = seen.clone();
                async move {
                    if let Some(value) = headers.get(X_RH_IDENTITY) {
                        *seen.lock().unwrap() =
                            Some(value.to_str().unwrap_or_default().to_string());
                    }

                    match id.as_str() {
                        "boom" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                        "garbled" => "not json at all".into_response(),
                        _ => Json(json!({"data": [{"id": "101"}, {"id": "102"}]}))
                            .into_response(),
                    }
                }
            }),
        )
        .route(
            "/sources/:id/endpoints",
            get(|| async { Json(json!({"data": [{"id": "201"}]})) }),
        )
        .route("/health", get(|| async { StatusCode::OK }))
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_inventory() -> (SocketAddr, SeenIdentity) {
    let seen: SeenIdentity = Arc::new(Mutex::new(None));
    let addr = spawn_server(fake_inventory(seen.clone())).await;
    (addr, seen)
}

fn client_for(addr: SocketAddr) -> SourcesClient {
    SourcesClient::new(SourcesOptions {
        api_url: format!("http://{addr}"),
        health_url: format!("http://{addr}/health"),
    })
    .unwrap()
}

#[tokio::test]
async fn exists_maps_definitive_status_codes() {
    let (addr, _) = spawn_inventory().await;
    let client = client_for(addr);

    let present = client.source_exists("1", "token").await.unwrap();
    assert_eq!(present, SourceExistence::Present);

    let absent = client.source_exists("missing", "token").await.unwrap();
    assert_eq!(absent, SourceExistence::Absent);
}

#[tokio::test]
async fn exists_rejects_indeterminate_status() {
    let (addr, _) = spawn_inventory().await;
    let client = client_for(addr);

    let err = client.source_exists("boom", "token").await.unwrap_err();
    match err {
        LookupError::UnexpectedStatus { status, path } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(path.ends_with("/sources/boom"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn list_decodes_and_forwards_identity() {
    let (addr, seen) = spawn_inventory().await;
    let client = client_for(addr);

    let apps = client
        .list_sub_resources("1", SubResourceKind::Applications, "c2VjcmV0")
        .await
        .unwrap();

    let ids: Vec<&str> = apps.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102"]);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("c2VjcmV0"));
}

#[tokio::test]
async fn list_endpoints_uses_its_own_path() {
    let (addr, _) = spawn_inventory().await;
    let client = client_for(addr);

    let endpoints = client
        .list_sub_resources("1", SubResourceKind::Endpoints, "token")
        .await
        .unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].id, "201");
}

#[tokio::test]
async fn list_non_success_is_an_error() {
    let (addr, _) = spawn_inventory().await;
    let client = client_for(addr);

    let err = client
        .list_sub_resources("boom", SubResourceKind::Applications, "token")
        .await
        .unwrap_err();
    assert!(err.is_unexpected_status());
}

#[tokio::test]
async fn list_undecodable_body_is_an_error() {
    let (addr, _) = spawn_inventory().await;
    let client = client_for(addr);

    let err = client
        .list_sub_resources("garbled", SubResourceKind::Applications, "token")
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Decode { .. }));
}

#[tokio::test]
async fn health_probe_accepts_200_only() {
    let (addr, _) = spawn_inventory().await;
    client_for(addr).health().await.unwrap();

    let sick = spawn_server(Router::new().route(
        "/health",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    ))
    .await;
    let client = SourcesClient::new(SourcesOptions {
        api_url: format!("http://{sick}"),
        health_url: format!("http://{sick}/health"),
    })
    .unwrap();

    let err = client.health().await.unwrap_err();
    assert!(err.is_unexpected_status());
}

#[tokio::test]
async fn unreachable_inventory_is_a_transport_error() {
    // Nothing listens on port 9; connection is refused immediately.
    let client = SourcesClient::new(SourcesOptions {
        api_url: "http://127.0.0.1:9".to_string(),
        health_url: "http://127.0.0.1:9/health".to_string(),
    })
    .unwrap();

    let err = client.source_exists("1", "token").await.unwrap_err();
    assert!(matches!(err, LookupError::Http { .. }));
}
