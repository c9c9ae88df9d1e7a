// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::AppointmentBookingService;

pub fn appointment_routes(service: Arc<AppointmentBookingService>) -> Router {
    Router::new()
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/appointments/",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route("/appointments/book", post(handlers::book_appointment))
        .route("/appointments/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .with_state(service)
}
