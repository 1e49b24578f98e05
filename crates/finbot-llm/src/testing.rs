//! Scripted providers shared by the unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::providers::ChatProvider;
use crate::tools::ToolRegistry;
use crate::types::*;

enum StubOutcome {
    Reply(String),
    Fail(String),
}

/// A provider with a fixed outcome and a request counter
pub(crate) struct StubProvider {
    id: ProviderId,
    available: bool,
    outcome: StubOutcome,
    pub(crate) requests: Arc<AtomicUsize>,
    tools: ToolRegistry,
}

impl StubProvider {
    pub(crate) fn available(id: ProviderId, reply: impl Into<String>) -> Self {
        Self {
            id,
            available: true,
            outcome: StubOutcome::Reply(reply.into()),
            requests: Arc::new(AtomicUsize::new(0)),
            tools: ToolRegistry::new(),
        }
    }

    pub(crate) fn unavailable(id: ProviderId) -> Self {
        Self {
            id,
            available: false,
            outcome: StubOutcome::Fail("unavailable".to_string()),
            requests: Arc::new(AtomicUsize::new(0)),
            tools: ToolRegistry::new(),
        }
    }

    /// Available, but every request fails at the transport layer
    pub(crate) fn failing(id: ProviderId, message: impl Into<String>) -> Self {
        Self {
            id,
            available: true,
            outcome: StubOutcome::Fail(message.into()),
            requests: Arc::new(AtomicUsize::new(0)),
            tools: ToolRegistry::new(),
        }
    }

    pub(crate) fn with_request_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.requests = counter;
        self
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    fn name(&self) -> &'static str {
        "Stub"
    }

    fn id(&self) -> ProviderId {
        self.id
    }

    fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn raw_completion(
        &self,
        _messages: &[Message],
        _json_mode: bool,
        _tools: &[ToolSpec],
        _options: &ChatOptions,
    ) -> Result<Completion> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StubOutcome::Reply(reply) => Ok(Completion {
                content: reply.clone(),
                tool_calls: vec![],
                usage: TokenUsage::default(),
                raw: serde_json::json!({"stub": reply}),
            }),
            StubOutcome::Fail(message) => Err(LlmError::BackendCall {
                message: message.clone(),
            }),
        }
    }
}
