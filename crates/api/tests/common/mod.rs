use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use els_core::{AnnotationEngine, ImageSet, MemoryStore, Schema};
use http_body_util::BodyExt;
use tower::ServiceExt;

use els_api::config::ServerConfig;
use els_api::router::build_app_router;
use els_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_token: "test-admin-token".to_string(),
        schema_path: String::new(),
        images_dir: String::new(),
        images_manifest: None,
    }
}

/// A three-question schema exercising all three question kinds.
pub fn test_schema() -> Schema {
    Schema::from_json_str(
        r#"{
            "cell_types": { "type": "multi", "options": ["B", "T", "Ki67"] },
            "density": { "type": "single", "options": ["high", "moderate", "low"] },
            "gc_like": { "type": "boolean" }
        }"#,
    )
    .unwrap()
}

/// A fully valid answer payload for [`test_schema`].
pub fn valid_answers() -> serde_json::Value {
    serde_json::json!({
        "cell_types": ["B", "T"],
        "density": "high",
        "gc_like": false
    })
}

/// Build the full application router over an in-memory store.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses.
pub fn build_test_app() -> Router {
    let engine = AnnotationEngine::new(
        test_schema(),
        ImageSet::new(["img-1.png", "img-2.png", "img-3.png"].map(String::from)),
        Arc::new(MemoryStore::new()),
    );
    let config = test_config();
    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a GET request carrying the test admin token.
pub async fn get_admin(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header("x-admin-token", "test-admin-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a valid annotation and assert it was created.
pub async fn submit(app: &Router, annotator: &str, image: &str, answers: serde_json::Value) {
    let response = post_json(
        app.clone(),
        "/api/v1/annotations",
        &serde_json::json!({
            "annotator_id": annotator,
            "image_id": image,
            "answers": answers
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
