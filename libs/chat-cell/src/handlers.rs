// libs/chat-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};

use shared_models::AppError;

use crate::models::{ChatRequest, ChatResponse};
use crate::services::ConversationService;

/// One conversational turn. Model failures still answer 200 with a fallback
/// reply; only an empty message is rejected.
#[axum::debug_handler]
pub async fn chat(
    State(service): State<Arc<ConversationService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::ValidationError("Message cannot be empty".to_string()));
    }

    Ok(Json(service.handle(request).await))
}
