use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use finbot_llm::{
    AiManager, ChatOptions, ChatProvider, Completion, LlmError, Message, MessageRole,
    ProviderFactory, ProviderId, TokenUsage, ToolCall, ToolRegistry, ToolSpec,
};

/// Replays a scripted sequence of completions and records every
/// conversation it was sent.
struct ScriptedProvider {
    script: Mutex<VecDeque<Completion>>,
    requests: Arc<AtomicUsize>,
    conversations: Arc<Mutex<Vec<Vec<Message>>>>,
    tools: ToolRegistry,
}

impl ScriptedProvider {
    fn new(script: Vec<Completion>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Arc::new(AtomicUsize::new(0)),
            conversations: Arc::new(Mutex::new(Vec::new())),
            tools: ToolRegistry::new(),
        }
    }
}

fn text_completion(content: &str) -> Completion {
    Completion {
        content: content.to_string(),
        tool_calls: vec![],
        usage: TokenUsage::default(),
        raw: json!({"scripted": content}),
    }
}

fn tool_request_completion(id: &str, name: &str, arguments: serde_json::Value) -> Completion {
    Completion {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        usage: TokenUsage::default(),
        raw: json!({"scripted": "tool_use"}),
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "Scripted"
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
        true
    }

    async fn raw_completion(
        &self,
        messages: &[Message],
        _json_mode: bool,
        _tools: &[ToolSpec],
        _options: &ChatOptions,
    ) -> finbot_llm::Result<Completion> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.conversations.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::BackendCall {
                message: "script exhausted".to_string(),
            })
    }
}

fn transactions_spec() -> ToolSpec {
    ToolSpec::new(
        "get_date_transactions",
        "Fetch transactions within a date range",
        json!({
            "type": "object",
            "properties": {
                "start_time": {"type": "string"},
                "end_time": {"type": "string"}
            },
            "required": ["start_time", "end_time"]
        }),
    )
}

#[tokio::test]
async fn tool_loop_runs_callback_and_returns_second_response_text() {
    let mut provider = ScriptedProvider::new(vec![
        tool_request_completion(
            "call_1",
            "get_date_transactions",
            json!({"end_time": "20250310", "start_time": "20250301"}),
        ),
        text_completion("You spent 100 in that range."),
    ]);
    let requests = provider.requests.clone();
    let conversations = provider.conversations.clone();

    let seen_args: Arc<Mutex<Vec<serde_json::Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen_args.clone();
    provider.tools_mut().register(
        "get_date_transactions",
        vec!["start_time".to_string(), "end_time".to_string()],
        Arc::new(move |args| {
            *sink.lock().unwrap() = args;
            Ok("total: 100".to_string())
        }),
    );

    let response = provider
        .chat(
            "how much did I spend?",
            "you are a finance assistant",
            false,
            &[transactions_spec()],
            &ChatOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.content, "You spent 100 in that range.");
    assert_eq!(requests.load(Ordering::SeqCst), 2);

    // Callback got the argument values in its declared parameter order
    let args = seen_args.lock().unwrap();
    assert_eq!(*args, vec![json!("20250301"), json!("20250310")]);

    // The second request carried the tool-call echo and the tagged result
    let conversations = conversations.lock().unwrap();
    let second = &conversations[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, MessageRole::Assistant);
    assert_eq!(second[2].tool_calls[0].id, "call_1");
    assert_eq!(second[3].role, MessageRole::Tool);
    assert_eq!(second[3].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(second[3].content, "total: 100");
}

#[tokio::test]
async fn unknown_tool_aborts_before_second_request() {
    let provider = ScriptedProvider::new(vec![
        tool_request_completion("call_1", "not_registered", json!({})),
        text_completion("never reached"),
    ]);
    let requests = provider.requests.clone();

    let err = provider
        .chat("hi", "sys", false, &[transactions_spec()], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::UnknownTool { name } if name == "not_registered"));
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_tool_argument_aborts_before_second_request() {
    let mut provider = ScriptedProvider::new(vec![
        tool_request_completion(
            "call_1",
            "get_date_transactions",
            json!({"start_time": "20250301"}),
        ),
        text_completion("never reached"),
    ]);
    let requests = provider.requests.clone();
    provider.tools_mut().register(
        "get_date_transactions",
        vec!["start_time".to_string(), "end_time".to_string()],
        Arc::new(|_| Ok(String::new())),
    );

    let err = provider
        .chat("hi", "sys", false, &[transactions_spec()], &ChatOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::MissingToolArgument { param, .. } if param == "end_time"));
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn chat_without_tool_request_resolves_on_first_response() {
    let provider = ScriptedProvider::new(vec![text_completion("direct answer")]);
    let requests = provider.requests.clone();

    let response = provider
        .chat("hi", "sys", false, &[transactions_spec()], &ChatOptions::default())
        .await
        .unwrap();

    assert_eq!(response.content, "direct answer");
    assert_eq!(response.raw_response["scripted"], "direct answer");
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn manager_stamps_registered_tools_onto_fresh_instances() {
    let factory = ProviderFactory::empty()
        .register(ProviderId::Claude, || {
            Box::new(ScriptedProvider::new(vec![
                tool_request_completion(
                    "call_7",
                    "get_date_transactions",
                    json!({"start_time": "20250301", "end_time": "20250310"}),
                ),
                text_completion("summary ready"),
            ]))
        })
        .with_priority(vec![ProviderId::Claude]);

    let mut manager = AiManager::new().with_factory(factory);
    manager.register_tool(
        "get_date_transactions",
        vec!["start_time".to_string(), "end_time".to_string()],
        Arc::new(|_| Ok("[]".to_string())),
    );

    let response = manager
        .chat(
            "summarize my spending",
            None,
            false,
            &[transactions_spec()],
            &ChatOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.content, "summary ready");
}
