// libs/doctor-cell/tests/handlers_test.rs

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Weekday;
use serde_json::{json, Value};
use tower::ServiceExt;

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::{next_weekday, seeded_store};

async fn create_test_app() -> Router {
    doctor_routes(seeded_store().await)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_doctors_with_and_without_trailing_slash() {
    let app = create_test_app().await;

    let (status, json) = send(app.clone(), get("/doctors/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 5);

    let (status, json) = send(app, get("/doctors")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["name"], "Dr. Sarah Johnson");
}

#[tokio::test]
async fn test_create_doctor() {
    let app = create_test_app().await;

    let (status, json) = send(
        app.clone(),
        post_json(
            "/doctors/",
            json!({"name": "Dr. Anna Lee", "specialty": "Neurology", "department": "Neurology"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 6);
    assert!(json["created_at"].is_string());

    let (status, json) = send(app, post_json("/doctors/", json!({"name": "", "specialty": "x", "department": "y"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_doctors_by_specialty() {
    let app = create_test_app().await;

    let (status, json) = send(app, get("/doctors/specialty/ortho")).await;

    assert_eq!(status, StatusCode::OK);
    let specialties: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["specialty"].as_str().unwrap())
        .collect();
    assert_eq!(specialties, vec!["Orthopedics", "Orthopedics"]);
}

#[tokio::test]
async fn test_check_availability_endpoint() {
    let app = create_test_app().await;
    let monday = next_weekday(Weekday::Mon).format("%Y-%m-%d").to_string();

    let uri = format!("/doctors/check-availability?doctor_name=Emily&date={}&time=09:00", monday);
    let (status, json) = send(app.clone(), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], true);
    assert_eq!(json["doctor"]["name"], "Dr. Emily Davis");

    let uri = format!("/doctors/check-availability?doctor_name=Emily&date={}&time=18:00", monday);
    let (status, json) = send(app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"available": false, "reason": "Time is outside doctor's working hours"}));
}

#[tokio::test]
async fn test_available_doctors_endpoint() {
    let app = create_test_app().await;

    let sunday = next_weekday(Weekday::Sun).format("%Y-%m-%d").to_string();
    let (status, json) = send(app.clone(), get(&format!("/doctors/available?date={}&time=10:00", sunday))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available_doctors"], json!([]));

    let friday = next_weekday(Weekday::Fri).format("%Y-%m-%d").to_string();
    let (_, json) = send(app, get(&format!("/doctors/available?date={}&time=16:30", friday))).await;
    assert_eq!(json["available_doctors"].as_array().unwrap().len(), 5);
    assert_eq!(json["available_doctors"][4]["department"], "Internal Medicine");
}

#[tokio::test]
async fn test_availability_windows() {
    let app = create_test_app().await;

    let (status, json) = send(
        app.clone(),
        post_json(
            "/doctor-availability/",
            json!({"doctor_id": 3, "day_of_week": 5, "start_time": "10:00", "end_time": "14:00"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_available"], true);
    assert_eq!(json["start_time"], "10:00");

    let saturday = next_weekday(Weekday::Sat).format("%Y-%m-%d").to_string();
    let uri = format!("/doctors/check-availability?doctor_name=Davis&date={}&time=13:30", saturday);
    let (_, json) = send(app.clone(), get(&uri)).await;
    assert_eq!(json["available"], true);

    let (status, _) = send(
        app.clone(),
        post_json(
            "/doctor-availability/",
            json!({"doctor_id": 3, "day_of_week": 9, "start_time": "10:00", "end_time": "14:00"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(app, get("/doctor-availability/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 26);
}
