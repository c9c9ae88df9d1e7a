// libs/patient-cell/tests/handlers_test.rs

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use patient_cell::create_patient_router;
use shared_utils::test_utils::seeded_store;

async fn create_test_app() -> Router {
    create_patient_router(seeded_store().await)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn post_patient(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/patients/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_patient_normalises_blank_fields() {
    let app = create_test_app().await;

    let (status, json) = send(
        app,
        post_patient(json!({"name": "Maria Garcia", "phone": "+15550100", "email": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 3);
    assert_eq!(json["phone"], "+15550100");
    assert_eq!(json["email"], Value::Null);
}

#[tokio::test]
async fn test_duplicate_phone_returns_conflict() {
    let app = create_test_app().await;

    let (status, json) = send(app, post_patient(json!({"name": "John S.", "phone": "+1234567890"}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("+1234567890"));
}

#[tokio::test]
async fn test_list_and_lookup_by_phone() {
    let app = create_test_app().await;

    let request = Request::builder().uri("/patients").body(Body::empty()).unwrap();
    let (status, json) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let request = Request::builder()
        .uri("/patients/phone/%2B1234567891")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Jane Doe");

    let request = Request::builder()
        .uri("/patients/phone/000")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
