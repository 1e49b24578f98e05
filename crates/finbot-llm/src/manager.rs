//! Orchestrator: tries a preferred provider, falls back through the
//! priority list, aggregates errors
//!
//! The manager is an explicitly constructed handle owned by the
//! top-level process and passed to the components that need
//! completions. Each call constructs a fresh provider instance through
//! the factory; the manager's tool registrations are stamped onto that
//! instance before the call.

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::factory::ProviderFactory;
use crate::tools::{ToolHandler, ToolRegistry};
use crate::types::*;

enum CallKind<'a> {
    Simple { content: &'a str },
    Chat { query: &'a str, tools: &'a [ToolSpec] },
}

/// Entry point callers use to request a completion without knowing
/// which backend answers it
pub struct AiManager {
    preferred: Option<ProviderId>,
    factory: ProviderFactory,
    system_prompt: String,
    tools: ToolRegistry,
}

impl AiManager {
    pub fn new() -> Self {
        Self {
            preferred: None,
            factory: ProviderFactory::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tools: ToolRegistry::new(),
        }
    }

    /// Provider tried first, before the priority list
    pub fn with_preferred(mut self, preferred: ProviderId) -> Self {
        self.preferred = Some(preferred);
        self
    }

    pub fn with_factory(mut self, factory: ProviderFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Replace the default instruction text used when a caller passes
    /// no system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Register a tool callback; it is installed on every provider
    /// instance the manager constructs for a `chat` call
    pub fn register_tool(
        &mut self,
        name: impl Into<String>,
        params: Vec<String>,
        handler: ToolHandler,
    ) {
        self.tools.register(name, params, handler);
    }

    /// Request a completion: dispatches to [`chat`] when tools are
    /// declared, otherwise to [`simple_chat`]
    ///
    /// [`chat`]: AiManager::chat
    /// [`simple_chat`]: AiManager::simple_chat
    pub async fn run(
        &self,
        content: &str,
        system_prompt: Option<&str>,
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        if tools.is_empty() {
            self.simple_chat(content, system_prompt, json_mode, options).await
        } else {
            self.chat(content, system_prompt, json_mode, tools, options).await
        }
    }

    /// Single-turn completion with failover
    pub async fn simple_chat(
        &self,
        content: &str,
        system_prompt: Option<&str>,
        json_mode: bool,
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        self.failover(CallKind::Simple { content }, system_prompt, json_mode, options)
            .await
    }

    /// Tool-capable completion with failover
    pub async fn chat(
        &self,
        query: &str,
        system_prompt: Option<&str>,
        json_mode: bool,
        tools: &[ToolSpec],
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        self.failover(CallKind::Chat { query, tools }, system_prompt, json_mode, options)
            .await
    }

    /// Preferred provider first, then every priority entry in order.
    /// Stops at the first success; a success is never suppressed in
    /// favor of a later provider. Each failed attempt is logged before
    /// the next one starts, and only the last error survives into
    /// `AllProvidersFailed`.
    async fn failover(
        &self,
        call: CallKind<'_>,
        system_prompt: Option<&str>,
        json_mode: bool,
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        let prompt = system_prompt.unwrap_or(&self.system_prompt);
        let mut last: Option<LlmError> = None;

        if let Some(preferred) = self.preferred {
            match self.attempt(preferred, &call, prompt, json_mode, options).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(provider = %preferred, error = %e, "preferred provider failed");
                    last = Some(e);
                }
            }
        }

        // The preferred provider may appear again here; each attempt
        // is independent, so retrying it is harmless.
        for &id in self.factory.priority() {
            match self.attempt(id, &call, prompt, json_mode, options).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(provider = %id, error = %e, "provider attempt failed");
                    last = Some(e);
                }
            }
        }

        Err(LlmError::AllProvidersFailed {
            last: Box::new(last.unwrap_or(LlmError::NoAvailableProvider)),
        })
    }

    async fn attempt(
        &self,
        id: ProviderId,
        call: &CallKind<'_>,
        system_prompt: &str,
        json_mode: bool,
        options: &ChatOptions,
    ) -> Result<AiResponse> {
        let mut service = self.factory.get_service(Some(id)).await?;
        match call {
            CallKind::Simple { content } => {
                service.simple_chat(content, system_prompt, json_mode, options).await
            }
            CallKind::Chat { query, tools } => {
                *service.tools_mut() = self.tools.clone();
                service.chat(query, system_prompt, json_mode, tools, options).await
            }
        }
    }
}

impl Default for AiManager {
    fn default() -> Self {
        Self::new()
    }
}
