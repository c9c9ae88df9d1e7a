use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::{appointment_routes, AppointmentBookingService};
use chat_cell::{chat_routes, ConversationService};
use doctor_cell::router::doctor_routes;
use patient_cell::create_patient_router;
use shared_database::{ClinicStore, SharedStore};
use shared_models::{AppError, DoctorSummary};

/// Everything the cells need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub booking: Arc<AppointmentBookingService>,
    pub conversation: Arc<ConversationService>,
}

pub fn create_router(state: AppState) -> Router {
    let service_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/debug/doctors", get(debug_doctors))
        .with_state(state.store.clone());

    service_routes
        .merge(doctor_routes(state.store.clone()))
        .merge(create_patient_router(state.store.clone()))
        .merge(appointment_routes(state.booking.clone()))
        .merge(chat_routes(state.conversation.clone()))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Clinic Assistant API is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "clinic-assistant-api"
    }))
}

async fn debug_doctors(State(store): State<SharedStore>) -> Result<Json<Value>, AppError> {
    let doctors: Vec<DoctorSummary> = store
        .list_doctors()
        .await?
        .iter()
        .map(DoctorSummary::from)
        .collect();

    Ok(Json(json!({
        "count": doctors.len(),
        "doctors": doctors
    })))
}
