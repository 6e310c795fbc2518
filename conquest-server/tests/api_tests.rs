//! Integration tests for the conquest-server HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use conquest_server::persistence::{MemoryStore, PersistencePolicy, SnapshotStore};
use conquest_server::{create_router, ServerConfig, ServerState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let config = ServerConfig::default();
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let state = Arc::new(ServerState::new(store, PersistencePolicy::FailAction));
    create_router(&config, state)
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Plain GET without the upgrade handshake is not accepted
    assert_ne!(response.status(), StatusCode::OK);
}
