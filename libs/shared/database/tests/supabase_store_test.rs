use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{ClinicStore, StoreError, SupabaseStore};
use shared_models::{CreateAppointmentRequest, CreatePatientRequest};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        supabase_url: server.uri(),
        supabase_api_key: "test-service-key".to_string(),
        ..Default::default()
    }
}

fn doctor_row(id: i64, name: &str, specialty: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "specialty": specialty,
        "department": "Internal Medicine",
        "created_at": "2025-01-01T08:00:00.000000+00:00"
    })
}

#[tokio::test]
async fn test_find_doctor_by_name_uses_ilike_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("name", "ilike.*johnson*"))
        .and(query_param("order", "id.asc"))
        .and(query_param("limit", "1"))
        .and(header("apikey", "test-service-key"))
        .and(header("Authorization", "Bearer test-service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_row(1, "Dr. Sarah Johnson", "Cardiology")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let doctor = store.find_doctor_by_name("johnson").await.unwrap().unwrap();

    assert_eq!(doctor.id, 1);
    assert_eq!(doctor.specialty, "Cardiology");
}

#[tokio::test]
async fn test_missing_rows_are_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("phone", "eq.+15550001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let patient = store.find_patient_by_phone("+15550001").await.unwrap();

    assert!(patient.is_none());
}

#[tokio::test]
async fn test_open_window_parses_postgres_times() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_availability"))
        .and(query_param("doctor_id", "eq.3"))
        .and(query_param("day_of_week", "eq.0"))
        .and(query_param("is_available", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 11,
            "doctor_id": 3,
            "day_of_week": 0,
            "start_time": "09:00:00",
            "end_time": "17:00:00",
            "is_available": true
        }])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let window = store.find_open_window(3, 0).await.unwrap().unwrap();

    assert_eq!(window.id, 11);
    assert_eq!(window.start_time.to_string(), "09:00:00");
}

#[tokio::test]
async fn test_scheduled_lookup_filters_on_exact_instant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.1"))
        .and(query_param("appointment_date", "eq.2025-01-06T10:00:00"))
        .and(query_param("status", "eq.scheduled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 5,
            "doctor_id": 1,
            "patient_id": 2,
            "appointment_date": "2025-01-06T10:00:00",
            "status": "scheduled",
            "notes": null,
            "created_at": "2025-01-01T08:00:00+00:00"
        }])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let at = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(10, 0, 0).unwrap();
    let appointment = store.find_scheduled_appointment(1, at).await.unwrap().unwrap();

    assert_eq!(appointment.id, 5);
    assert_eq!(appointment.appointment_date, at);
}

#[tokio::test]
async fn test_insert_appointment_sends_scheduled_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "doctor_id": 1,
            "patient_id": 2,
            "appointment_date": "2025-01-06T10:00:00",
            "status": "scheduled"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 9,
            "doctor_id": 1,
            "patient_id": 2,
            "appointment_date": "2025-01-06T10:00:00",
            "status": "scheduled",
            "notes": "Checkup",
            "created_at": "2025-01-01T08:00:00+00:00"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let appointment = store
        .insert_appointment(CreateAppointmentRequest {
            doctor_id: 1,
            patient_id: 2,
            appointment_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            notes: Some("Checkup".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(appointment.id, 9);
    assert_eq!(appointment.notes.as_deref(), Some("Checkup"));
}

#[tokio::test]
async fn test_unique_violation_becomes_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": "Key (phone)=(+1234567890) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"patients_phone_key\""
        })))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let result = store
        .insert_patient(CreatePatientRequest {
            name: "John Smith".to_string(),
            phone: Some("+1234567890".to_string()),
            email: None,
        })
        .await;

    assert_matches!(result, Err(StoreError::Conflict(msg)) if msg.contains("patients_phone_key"));
}

#[tokio::test]
async fn test_server_failure_becomes_backend_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&config_for(&mock_server));
    let result = store.list_doctors().await;

    assert_matches!(result, Err(StoreError::Backend(_)));
}
