use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use shared_utils::KeyedLocks;

use crate::functions::clinic_functions;
use crate::models::{
    ChatMessage, ChatRequest, ChatResponse, CompletionRequest, FunctionChoice, FunctionDefinition,
    ModelReply,
};
use crate::services::dispatcher::ChatFunctionDispatcher;
use crate::services::llm::LanguageModel;
use crate::services::session::SessionStore;

/// Sent when the first model round fails.
pub const FALLBACK_MODEL_UNAVAILABLE: &str = "I apologize, but I'm experiencing some technical difficulties. Please try again in a moment, or contact our clinic directly for assistance.";
/// Sent when the follow-up round after a function call fails.
pub const FALLBACK_FOLLOW_UP: &str = "I understand your request, but I'm having trouble processing it right now. Please try rephrasing your question or contact our clinic directly.";
/// Sent when the model's function arguments are not valid JSON.
pub const FALLBACK_BAD_ARGUMENTS: &str = "I understand your request, but I'm having some technical difficulties. Please try again or contact our clinic directly for assistance.";

pub fn system_prompt(today: NaiveDate) -> String {
    format!(
        "You are a helpful assistant for Super Clinic, a multi-specialty medical facility. \
You help patients book appointments with doctors across various specialties.

You can:
- Check doctor availability
- Find doctors by specialty
- Book appointments
- Provide information about available doctors and their specialties

Available specialties include: Cardiology, Orthopedics, Neurology, Dermatology, Pediatrics, \
Gynecology, General Medicine, Ophthalmology, ENT, Psychiatry, Gastroenterology, Urology, \
Pulmonology, Endocrinology, Nephrology, Oncology, and Rheumatology.

Today is {} ({}). Dates passed to functions use YYYY-MM-DD and times use 24-hour HH:MM.

Always be polite and helpful. When booking appointments, collect the patient's name and phone number.

If a patient describes symptoms, suggest an appropriate specialist but explain that you cannot give \
medical advice, and recommend consulting a qualified doctor for diagnosis and treatment.",
        today.format("%Y-%m-%d"),
        today.format("%A"),
    )
}

/// Caps the history before a new user message is appended: when it holds
/// more than `limit` entries, the system message and the newest
/// `limit - 2` entries are kept. A function result whose call was cut off is
/// dropped as well.
pub fn trim_history(history: &mut Vec<ChatMessage>, limit: usize) {
    if history.len() <= limit {
        return;
    }

    let keep = limit.saturating_sub(2);
    let mut start = history.len() - keep;
    while start < history.len() && matches!(history[start], ChatMessage::FunctionResult { .. }) {
        start += 1;
    }

    history.drain(1..start);
}

struct TurnOutcome {
    response: String,
    function_called: Option<String>,
    function_result: Option<Value>,
}

impl TurnOutcome {
    fn reply(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            function_called: None,
            function_result: None,
        }
    }
}

pub struct ConversationService {
    model: Arc<dyn LanguageModel>,
    sessions: Arc<dyn SessionStore>,
    dispatcher: ChatFunctionDispatcher,
    functions: Vec<FunctionDefinition>,
    history_limit: usize,
    session_locks: KeyedLocks<String>,
}

impl ConversationService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        sessions: Arc<dyn SessionStore>,
        dispatcher: ChatFunctionDispatcher,
        history_limit: usize,
    ) -> Self {
        Self {
            model,
            sessions,
            dispatcher,
            functions: clinic_functions(),
            history_limit,
            session_locks: KeyedLocks::new(),
        }
    }

    /// Runs one chat turn. Always produces a reply; model failures turn into
    /// fixed fallback texts.
    pub async fn handle(&self, request: ChatRequest) -> ChatResponse {
        let session_id = request
            .session_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let _turn = self.session_locks.lock(session_id.clone()).await;

        let mut history = match self.sessions.load(&session_id).await {
            Ok(Some(history)) if !history.is_empty() => history,
            Ok(_) => {
                info!("Starting chat session {}", session_id);
                vec![ChatMessage::system(system_prompt(Local::now().date_naive()))]
            }
            Err(e) => {
                warn!("Could not load session {}, starting fresh: {}", session_id, e);
                vec![ChatMessage::system(system_prompt(Local::now().date_naive()))]
            }
        };

        trim_history(&mut history, self.history_limit);
        history.push(ChatMessage::user(request.message));

        let outcome = self.run_turn(&mut history).await;
        history.push(ChatMessage::assistant(outcome.response.clone()));

        if let Err(e) = self.sessions.save(&session_id, &history).await {
            warn!("Could not save session {}: {}", session_id, e);
        }

        ChatResponse {
            response: outcome.response,
            session_id,
            function_called: outcome.function_called,
            function_result: outcome.function_result,
        }
    }

    async fn run_turn(&self, history: &mut Vec<ChatMessage>) -> TurnOutcome {
        let first = self
            .model
            .complete(CompletionRequest {
                messages: history.clone(),
                functions: self.functions.clone(),
                choice: FunctionChoice::Auto,
            })
            .await;

        let call = match first {
            Ok(ModelReply::Message(text)) => return TurnOutcome::reply(text),
            Ok(ModelReply::FunctionCall(call)) => call,
            Err(e) => {
                warn!("Model unavailable, sending fallback reply: {}", e);
                return TurnOutcome::reply(FALLBACK_MODEL_UNAVAILABLE);
            }
        };

        let arguments: Value = match serde_json::from_str(&call.arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                warn!("Model sent unparseable arguments for {}: {}", call.name, e);
                return TurnOutcome::reply(FALLBACK_BAD_ARGUMENTS);
            }
        };

        info!("Model requested function {}", call.name);
        let result = self.dispatcher.dispatch(&call.name, arguments).await;

        history.push(ChatMessage::FunctionCall { call: call.clone() });
        history.push(ChatMessage::FunctionResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: result.to_string(),
        });

        let follow_up = self
            .model
            .complete(CompletionRequest {
                messages: history.clone(),
                functions: self.functions.clone(),
                choice: FunctionChoice::Disabled,
            })
            .await;

        match follow_up {
            Ok(ModelReply::Message(text)) => TurnOutcome {
                response: text,
                function_called: Some(call.name),
                function_result: Some(result),
            },
            Ok(ModelReply::FunctionCall(extra)) => {
                warn!("Model requested {} during the follow-up round", extra.name);
                TurnOutcome::reply(FALLBACK_FOLLOW_UP)
            }
            Err(e) => {
                warn!("Follow-up round failed, sending fallback reply: {}", e);
                TurnOutcome::reply(FALLBACK_FOLLOW_UP)
            }
        }
    }
}
