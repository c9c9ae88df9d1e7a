use axum::{routing::get, Router};

use shared_database::SharedStore;

use crate::handlers;

pub fn doctor_routes(store: SharedStore) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors).post(handlers::create_doctor))
        .route("/doctors/", get(handlers::list_doctors).post(handlers::create_doctor))
        .route("/doctors/specialty/{specialty}", get(handlers::doctors_by_specialty))
        .route("/doctors/available", get(handlers::available_doctors))
        .route("/doctors/check-availability", get(handlers::check_availability))
        .route(
            "/doctor-availability",
            get(handlers::list_availability).post(handlers::create_availability),
        )
        .route(
            "/doctor-availability/",
            get(handlers::list_availability).post(handlers::create_availability),
        )
        .with_state(store)
}
