pub mod conversation;
pub mod dispatcher;
pub mod llm;
pub mod retry;
pub mod session;

pub use conversation::ConversationService;
pub use dispatcher::{ChatFunctionDispatcher, ClinicFunction, DispatchError};
pub use llm::{LanguageModel, LlmError, OpenAiClient};
pub use retry::RetryPolicy;
pub use session::{InMemorySessionStore, RedisSessionStore, SessionError, SessionStore};
