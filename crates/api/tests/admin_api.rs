//! Integration tests for the admin export surface.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app, get, get_admin, submit, valid_answers};
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Token gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_endpoints_require_the_token() {
    let app = build_test_app();
    let response = get(app, "/api/v1/admin/export/consensus").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn wrong_admin_token_is_rejected() {
    let app = build_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/admin/export/raw")
                .header("x-admin-token", "not-the-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Raw export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn raw_export_lists_all_records() {
    let app = build_test_app();
    submit(&app, "bob", "img-2.png", valid_answers()).await;
    submit(&app, "alice", "img-1.png", valid_answers()).await;

    let json = body_json(get_admin(app, "/api/v1/admin/export/raw").await).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Stable order: annotator, then image.
    assert_eq!(records[0]["annotator_id"], "alice");
    assert_eq!(records[1]["annotator_id"], "bob");
    assert!(records[0]["submitted_at"].is_string());
}

// ---------------------------------------------------------------------------
// Consensus export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn consensus_export_covers_every_image() {
    let app = build_test_app();
    submit(&app, "alice", "img-1.png", valid_answers()).await;

    let json = body_json(get_admin(app, "/api/v1/admin/export/consensus").await).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["image_id"], "img-1.png");
    assert_eq!(records[0]["annotator_count"], 1);

    // Untouched images still appear, marked no-consensus.
    assert_eq!(records[2]["annotator_count"], 0);
    assert_eq!(
        records[2]["questions"]["density"]["value"]["status"],
        "no_consensus"
    );
}

#[tokio::test]
async fn single_image_consensus_reports_majority_and_ties() {
    let app = build_test_app();
    submit(&app, "alice", "img-1.png", valid_answers()).await;

    let mut disagreeing = valid_answers();
    disagreeing["density"] = json!("low");
    disagreeing["gc_like"] = json!(true);
    submit(&app, "bob", "img-1.png", disagreeing).await;

    let mut third = valid_answers();
    third["gc_like"] = json!(true);
    submit(&app, "carol", "img-1.png", third).await;

    let json = body_json(get_admin(app, "/api/v1/admin/consensus/img-1.png").await).await;
    let questions = &json["data"]["questions"];

    // density: high 2, low 1 -> high wins.
    assert_eq!(questions["density"]["value"]["status"], "agreed");
    assert_eq!(questions["density"]["value"]["value"], "high");
    assert_eq!(questions["density"]["tally"]["high"], 2);
    assert_eq!(questions["density"]["tally"]["low"], 1);

    // gc_like: true 2, false 1 -> true wins.
    assert_eq!(questions["gc_like"]["value"]["value"], true);

    // cell_types: B and T selected by all three -> both in the set.
    assert_eq!(questions["cell_types"]["value"]["value"], json!(["B", "T"]));

    assert_eq!(json["data"]["annotator_count"], 3);
}

#[tokio::test]
async fn tied_vote_is_reported_as_no_consensus() {
    let app = build_test_app();
    submit(&app, "alice", "img-1.png", valid_answers()).await;

    let mut other = valid_answers();
    other["density"] = json!("low");
    submit(&app, "bob", "img-1.png", other).await;

    let json = body_json(get_admin(app, "/api/v1/admin/consensus/img-1.png").await).await;
    let density = &json["data"]["questions"]["density"];
    assert_eq!(density["value"]["status"], "no_consensus");
    assert_eq!(density["tally"]["high"], 1);
    assert_eq!(density["tally"]["low"], 1);
}

#[tokio::test]
async fn consensus_for_unknown_image_is_404() {
    let app = build_test_app();
    let response = get_admin(app, "/api/v1/admin/consensus/missing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_IMAGE");
}
