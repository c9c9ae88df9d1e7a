use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

#[cfg(test)]
use mockall::automock;

use shared_config::AppConfig;

use crate::models::{ChatMessage, CompletionRequest, FunctionCall, FunctionChoice, ModelReply};
use crate::services::retry::RetryPolicy;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM provider is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A chat model that can either answer or ask for one function call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<ModelReply, LlmError>;
}

/// OpenAI chat-completions client using the `tools` protocol.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(config: &AppConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send_once(&self, body: &WireRequest<'_>) -> Result<ModelReply, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending chat completion request to {} ({} messages)", url, body.messages.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Chat completion failed: {} - {}", status, response_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let completion: WireResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        completion.into_reply()
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ModelReply, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let body = WireRequest::new(&self.model, self.temperature, &request);
        self.retry
            .run("Chat completion", |_| self.send_once(&body))
            .await
    }
}

// ==============================================================================
// WIRE FORMAT
// ==============================================================================

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

impl<'a> WireRequest<'a> {
    fn new(model: &'a str, temperature: f32, request: &'a CompletionRequest) -> Self {
        let tools: Vec<WireTool<'a>> = request
            .functions
            .iter()
            .map(|f| WireTool {
                kind: "function",
                function: WireFunction {
                    name: &f.name,
                    description: &f.description,
                    parameters: &f.parameters,
                },
            })
            .collect();

        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some(match request.choice {
                FunctionChoice::Auto => "auto",
                FunctionChoice::Disabled => "none",
            })
        };

        Self {
            model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature,
            tools,
            tool_choice,
        }
    }
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        match message {
            ChatMessage::System { content } => WireMessage::text("system", content),
            ChatMessage::User { content } => WireMessage::text("user", content),
            ChatMessage::Assistant { content } => WireMessage::text("assistant", content),
            ChatMessage::FunctionCall { call } => WireMessage {
                role: "assistant".to_string(),
                content: None,
                tool_calls: Some(vec![WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireCalledFunction {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                }]),
                tool_call_id: None,
            },
            ChatMessage::FunctionResult { call_id, content, .. } => WireMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireCalledFunction,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Serialize, Deserialize)]
struct WireCalledFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

impl WireResponse {
    fn into_reply(self) -> Result<ModelReply, LlmError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::MalformedResponse("response has no choices".to_string()))?;

        let first_call = message.tool_calls.and_then(|calls| calls.into_iter().next());
        if let Some(call) = first_call {
            return Ok(ModelReply::FunctionCall(FunctionCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            }));
        }

        Ok(ModelReply::Message(message.content.unwrap_or_default()))
    }
}
