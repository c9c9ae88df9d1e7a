pub mod functions;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ChatMessage, ChatRequest, ChatResponse};
pub use router::chat_routes;
pub use services::{
    ChatFunctionDispatcher, ConversationService, InMemorySessionStore, LanguageModel, OpenAiClient,
    RedisSessionStore, RetryPolicy, SessionStore,
};
