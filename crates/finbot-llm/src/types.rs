//! Common types for provider interactions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during an orchestration call
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("credential missing for provider: {provider}")]
    CredentialMissing { provider: String },

    #[error("backend call failed: {message}")]
    BackendCall { message: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("backend requested unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("tool '{tool}' missing argument: {param}")]
    MissingToolArgument { tool: String, param: String },

    #[error("unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("no available provider in priority list")]
    NoAvailableProvider,

    #[error("all providers failed: {last}")]
    AllProvidersFailed {
        #[source]
        last: Box<LlmError>,
    },
}

pub type Result<T> = std::result::Result<T, LlmError>;

/// Identifier of a registered backend, used as a map key only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    DeepSeek,
    OpenAi,
    Claude,
}

impl ProviderId {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deepseek" => Some(Self::DeepSeek),
            "openai" | "gpt" => Some(Self::OpenAi),
            "claude" | "anthropic" => Some(Self::Claude),
            _ => None,
        }
    }

    /// Failover order. Every id listed here must have a registered
    /// implementation in the factory.
    pub fn priority() -> &'static [ProviderId] {
        &[Self::DeepSeek, Self::OpenAi, Self::Claude]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeepSeek => write!(f, "deepseek"),
            Self::OpenAi => write!(f, "openai"),
            Self::Claude => write!(f, "claude"),
        }
    }
}

/// Role of a message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in a conversation
///
/// Prior messages are never mutated once sent; the tool-call loop
/// appends to a growing copy of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Set on tool-result messages, echoing the backend's call id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Set on the assistant message that requested a tool
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_call_id: None,
            tool_calls: vec![],
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: None,
            tool_calls: vec![],
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            tool_calls: vec![],
        }
    }

    /// Assistant message echoing a backend's tool-invocation request
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            tool_calls,
        }
    }

    /// Tool-result message tagged with the originating call id
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(call_id.into()),
            tool_calls: vec![],
        }
    }
}

/// Declaration of a tool the backend may request, sent per call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's arguments
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool invocation requested by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Backend selection parameters for one call
///
/// Unset fields fall back to the provider's configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The unmodified result of exactly one backend request
#[derive(Debug, Clone)]
pub struct Completion {
    /// Textual content, empty when the backend only requested tools
    pub content: String,
    /// Non-empty iff the backend requested a tool invocation
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
    /// Full decoded backend payload, kept for diagnostics
    pub raw: serde_json::Value,
}

/// Terminal output of every successful call path
#[derive(Debug, Clone)]
pub struct AiResponse {
    /// Final text; callers parse it as JSON themselves when they
    /// requested JSON mode
    pub content: String,
    pub raw_response: serde_json::Value,
}

impl AiResponse {
    pub fn from_completion(completion: Completion) -> Self {
        Self {
            content: completion.content,
            raw_response: completion.raw,
        }
    }
}
