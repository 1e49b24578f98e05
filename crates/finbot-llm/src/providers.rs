//! Capability provider implementations
//!
//! One implementation per backend, all behind the [`ChatProvider`]
//! trait. The higher-level `simple_chat` and `chat` operations are
//! provided methods built on each backend's `raw_completion`
//! primitive, so the tool-call loop is written once and every backend
//! inherits it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ClaudeConfig, DeepSeekConfig, OpenAiConfig};
use crate::tools::{ToolHandler, ToolRegistry};
use crate::types::*;

/// Trait for chat-completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider id
    fn id(&self) -> ProviderId;

    /// Tool callbacks registered against this instance
    fn tools(&self) -> &ToolRegistry;

    fn tools_mut(&mut self) -> &mut ToolRegistry;

    /// Check if the provider is available (credential present); never
    /// performs a network call
    async fn is_available(&self) -> bool;

    /// Issue exactly one request to the backend with the given
    /// conversation and declared tools, returning the unmodified
    /// structured result
    async fn raw_completion(
        &self,
        messages: &[Message],
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<Completion>;

    /// Register a tool callback on this instance
    fn register_tool(&mut self, name: impl Into<String>, params: Vec<String>, handler: ToolHandler)
    where
        Self: Sized,
    {
        self.tools_mut().register(name, params, handler);
    }

    /// Single-turn call: system + user message, no tools
    ///
    /// The backend's text is returned unmodified; callers parse JSON
    /// themselves when they asked for `json_mode`.
    async fn simple_chat(
        &self,
        content: &str,
        system_prompt: &str,
        json_mode: bool,
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        if !self.is_available().await {
            return Err(LlmError::CredentialMissing {
                provider: self.id().to_string(),
            });
        }

        let messages = [Message::system(system_prompt), Message::user(content)];
        let completion = self.raw_completion(&messages, json_mode, &[], options).await?;
        Ok(AiResponse::from_completion(completion))
    }

    /// Multi-turn call with at most one tool round trip
    ///
    /// If the backend's response requests a tool invocation, the call
    /// is resolved against this instance's registry, the callback runs
    /// to completion, and the conversation is resubmitted once with
    /// the result. The second response's text is final; a further tool
    /// request in it is not honored.
    async fn chat(
        &self,
        query: &str,
        system_prompt: &str,
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        if !self.is_available().await {
            return Err(LlmError::CredentialMissing {
                provider: self.id().to_string(),
            });
        }

        let mut messages = vec![Message::system(system_prompt), Message::user(query)];
        let first = self.raw_completion(&messages, json_mode, tools, options).await?;

        let Some(call) = first.tool_calls.first().cloned() else {
            return Ok(AiResponse::from_completion(first));
        };

        tracing::debug!(provider = %self.id(), tool = %call.name, "backend requested tool");
        let result = self.tools().resolve(&call)?;

        messages.push(Message::assistant_tool_calls(
            first.content.clone(),
            first.tool_calls.clone(),
        ));
        messages.push(Message::tool_result(call.id.clone(), result));

        let second = self.raw_completion(&messages, json_mode, tools, options).await?;
        if !second.tool_calls.is_empty() {
            tracing::warn!(
                provider = %self.id(),
                tool = %second.tool_calls[0].name,
                "backend requested a tool after the supported single round; returning text content"
            );
        }
        Ok(AiResponse::from_completion(second))
    }
}

impl std::fmt::Debug for dyn ChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatProvider").field("name", &self.name()).finish()
    }
}

// ============================================================================
// OpenAI-compatible wire dialect (DeepSeek, OpenAI)
// ============================================================================

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiWireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiWireTool>,
}

#[derive(Serialize)]
struct OpenAiWireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiWireToolCall>>,
}

#[derive(Serialize)]
struct OpenAiWireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAiWireFunctionDef,
}

#[derive(Serialize)]
struct OpenAiWireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct OpenAiWireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiWireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct OpenAiWireFunctionCall {
    name: String,
    /// Arguments arrive as a JSON-encoded string on this dialect
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChatChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChatChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAiWireToolCall>,
}

#[derive(Deserialize, Default)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// Resolved endpoint parameters for one OpenAI-dialect request
struct OpenAiCompatEndpoint<'a> {
    base_url: &'a str,
    api_key: &'a str,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

fn openai_wire_messages(messages: &[Message]) -> Vec<OpenAiWireMessage> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::System => OpenAiWireMessage {
                role: "system",
                content: msg.content.clone(),
                tool_call_id: None,
                tool_calls: None,
            },
            MessageRole::User => OpenAiWireMessage {
                role: "user",
                content: msg.content.clone(),
                tool_call_id: None,
                tool_calls: None,
            },
            MessageRole::Assistant => OpenAiWireMessage {
                role: "assistant",
                content: msg.content.clone(),
                tool_call_id: None,
                tool_calls: if msg.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        msg.tool_calls
                            .iter()
                            .map(|call| OpenAiWireToolCall {
                                id: call.id.clone(),
                                kind: "function".to_string(),
                                function: OpenAiWireFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.to_string(),
                                },
                            })
                            .collect(),
                    )
                },
            },
            MessageRole::Tool => OpenAiWireMessage {
                role: "tool",
                content: msg.content.clone(),
                tool_call_id: msg.tool_call_id.clone(),
                tool_calls: None,
            },
        })
        .collect()
}

async fn openai_compat_completion(
    client: &reqwest::Client,
    endpoint: OpenAiCompatEndpoint<'_>,
    messages: &[Message],
    json_mode: bool,
    tools: &[ToolSpec],
    options: &ChatOptions,
) -> Result<Completion> {
    let chat_request = OpenAiChatRequest {
        model: options.model.clone().unwrap_or(endpoint.model),
        messages: openai_wire_messages(messages),
        temperature: Some(options.temperature.unwrap_or(endpoint.temperature)),
        max_tokens: Some(options.max_tokens.unwrap_or(endpoint.max_tokens)),
        stream: false,
        response_format: if json_mode {
            Some(serde_json::json!({"type": "json_object"}))
        } else {
            None
        },
        tools: tools
            .iter()
            .map(|spec| OpenAiWireTool {
                kind: "function",
                function: OpenAiWireFunctionDef {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters: spec.parameters.clone(),
                },
            })
            .collect(),
    };

    let url = format!("{}/chat/completions", endpoint.base_url);
    let response = client
        .post(&url)
        .bearer_auth(endpoint.api_key)
        .json(&chat_request)
        .send()
        .await
        .map_err(|e| LlmError::BackendCall {
            message: e.to_string(),
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::BackendCall {
            message: format!("HTTP {}: {}", status, body),
        });
    }

    let raw: serde_json::Value = response.json().await.map_err(|e| LlmError::InvalidResponse {
        message: e.to_string(),
    })?;
    let chat_response: OpenAiChatResponse =
        serde_json::from_value(raw.clone()).map_err(|e| LlmError::InvalidResponse {
            message: e.to_string(),
        })?;

    let message = chat_response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| LlmError::InvalidResponse {
            message: "response carried no choices".to_string(),
        })?;

    let mut tool_calls = Vec::with_capacity(message.tool_calls.len());
    for call in message.tool_calls {
        let arguments =
            serde_json::from_str(&call.function.arguments).map_err(|e| LlmError::InvalidResponse {
                message: format!("undecodable tool arguments: {e}"),
            })?;
        tool_calls.push(ToolCall {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    let usage = chat_response.usage.unwrap_or_default();

    Ok(Completion {
        content: message.content.unwrap_or_default(),
        tool_calls,
        usage: TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
        raw,
    })
}

// ============================================================================
// DeepSeek Provider
// ============================================================================

/// DeepSeek chat API provider (OpenAI-compatible dialect)
pub struct DeepSeekProvider {
    config: DeepSeekConfig,
    client: reqwest::Client,
    tools: ToolRegistry,
}

impl DeepSeekProvider {
    pub fn new(config: DeepSeekConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            tools: ToolRegistry::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(DeepSeekConfig::from_env())
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "DeepSeek"
    }

    fn id(&self) -> ProviderId {
        ProviderId::DeepSeek
    }

    fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn raw_completion(
        &self,
        messages: &[Message],
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<Completion> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            LlmError::CredentialMissing {
                provider: self.id().to_string(),
            }
        })?;

        openai_compat_completion(
            &self.client,
            OpenAiCompatEndpoint {
                base_url: &self.config.base_url,
                api_key,
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
            messages,
            json_mode,
            tools,
            options,
        )
        .await
    }
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// OpenAI chat API provider
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
    tools: ToolRegistry,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            tools: ToolRegistry::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenAiConfig::from_env())
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn raw_completion(
        &self,
        messages: &[Message],
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<Completion> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            LlmError::CredentialMissing {
                provider: self.id().to_string(),
            }
        })?;

        openai_compat_completion(
            &self.client,
            OpenAiCompatEndpoint {
                base_url: &self.config.base_url,
                api_key,
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
            messages,
            json_mode,
            tools,
            options,
        )
        .await
    }
}

// ============================================================================
// Claude Provider
// ============================================================================

/// Anthropic Claude messages API provider
pub struct ClaudeProvider {
    config: ClaudeConfig,
    client: reqwest::Client,
    tools: ToolRegistry,
}

impl ClaudeProvider {
    pub fn new(config: ClaudeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            tools: ToolRegistry::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ClaudeConfig::from_env())
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

#[derive(Deserialize, Default)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

fn anthropic_wire_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
    let mut wire = Vec::new();
    for msg in messages {
        match msg.role {
            // System text is lifted into the request's system field
            MessageRole::System => continue,
            MessageRole::User => wire.push(AnthropicMessage {
                role: "user",
                content: serde_json::Value::String(msg.content.clone()),
            }),
            MessageRole::Assistant => {
                let mut blocks = Vec::new();
                if !msg.content.is_empty() {
                    blocks.push(serde_json::json!({"type": "text", "text": msg.content}));
                }
                for call in &msg.tool_calls {
                    blocks.push(serde_json::json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                wire.push(AnthropicMessage {
                    role: "assistant",
                    content: serde_json::Value::Array(blocks),
                });
            }
            // Tool results travel as a user message with a tool_result block
            MessageRole::Tool => wire.push(AnthropicMessage {
                role: "user",
                content: serde_json::json!([{
                    "type": "tool_result",
                    "tool_use_id": msg.tool_call_id,
                    "content": msg.content,
                }]),
            }),
        }
    }
    wire
}

#[async_trait]
impl ChatProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "Claude"
    }

    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn raw_completion(
        &self,
        messages: &[Message],
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<Completion> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            LlmError::CredentialMissing {
                provider: self.id().to_string(),
            }
        })?;

        let system_text = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone());

        // The messages API has no JSON-mode switch; constrain via the
        // system prompt instead.
        let system = if json_mode {
            Some(
                system_text.unwrap_or_default()
                    + "\n\nIMPORTANT: Respond with valid JSON only. No other text.",
            )
        } else {
            system_text
        };

        let anthropic_request = AnthropicRequest {
            model: options.model.clone().unwrap_or_else(|| self.config.model.clone()),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            system,
            messages: anthropic_wire_messages(messages),
            tools: tools
                .iter()
                .map(|spec| AnthropicTool {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    input_schema: spec.parameters.clone(),
                })
                .collect(),
            temperature: options.temperature,
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| LlmError::BackendCall {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BackendCall {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let raw: serde_json::Value =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: e.to_string(),
            })?;
        let anthropic_response: AnthropicResponse =
            serde_json::from_value(raw.clone()).map_err(|e| LlmError::InvalidResponse {
                message: e.to_string(),
            })?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in anthropic_response.content {
            match block {
                AnthropicBlock::Text { text } => content.push_str(&text),
                AnthropicBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input,
                }),
            }
        }

        Ok(Completion {
            content,
            tool_calls,
            usage: TokenUsage {
                prompt_tokens: anthropic_response.usage.input_tokens,
                completion_tokens: anthropic_response.usage.output_tokens,
                total_tokens: anthropic_response.usage.input_tokens
                    + anthropic_response.usage.output_tokens,
            },
            raw,
        })
    }
}
