// libs/chat-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::ConversationService;

pub fn chat_routes(service: Arc<ConversationService>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/chat/", post(handlers::chat))
        .with_state(service)
}
