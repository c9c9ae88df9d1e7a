use axum::{routing::get, Router};

use shared_database::SharedStore;

use crate::handlers::*;

pub fn create_patient_router(store: SharedStore) -> Router {
    Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/", get(list_patients).post(create_patient))
        .route("/patients/phone/{phone}", get(get_patient_by_phone))
        .with_state(store)
}
