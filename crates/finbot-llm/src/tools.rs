//! Tool registry: maps a tool name to a local callback and the
//! ordered parameter names the callback expects

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{LlmError, Result, ToolCall};

/// Synchronous tool callback. Receives argument values in the order
/// the tool was registered with; may block on a persistence query.
pub type ToolHandler =
    Arc<dyn Fn(Vec<serde_json::Value>) -> anyhow::Result<String> + Send + Sync>;

#[derive(Clone)]
struct RegisteredTool {
    params: Vec<String>,
    handler: ToolHandler,
}

/// Per-provider-instance mapping from tool name to callback.
///
/// Not designed for concurrent registration: register everything up
/// front, then the registry is read-only for the life of the provider
/// instance. Cloning shares the handlers.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        params: Vec<String>,
        handler: ToolHandler,
    ) {
        self.tools
            .insert(name.into(), RegisteredTool { params, handler });
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Resolve a backend tool-invocation request against the registry
    /// and run the callback.
    ///
    /// Argument values are selected from the request's argument map in
    /// the callback's declared parameter order.
    pub fn resolve(&self, call: &ToolCall) -> Result<String> {
        let tool = self.tools.get(&call.name).ok_or_else(|| LlmError::UnknownTool {
            name: call.name.clone(),
        })?;

        let mut args = Vec::with_capacity(tool.params.len());
        for param in &tool.params {
            let value = call.arguments.get(param).cloned().ok_or_else(|| {
                LlmError::MissingToolArgument {
                    tool: call.name.clone(),
                    param: param.clone(),
                }
            })?;
            args.push(value);
        }

        (tool.handler)(args).map_err(|e| LlmError::BackendCall {
            message: format!("tool '{}' failed: {e}", call.name),
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn resolves_arguments_in_declared_order() {
        let mut registry = ToolRegistry::new();
        registry.register(
            "get_date_transactions",
            vec!["start_time".to_string(), "end_time".to_string()],
            Arc::new(|args| Ok(format!("{}..{}", args[0], args[1]))),
        );

        // Argument map order differs from declared order
        let result = registry
            .resolve(&call(
                "get_date_transactions",
                json!({"end_time": "20250310", "start_time": "20250301"}),
            ))
            .unwrap();
        assert_eq!(result, "\"20250301\"..\"20250310\"");
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let registry = ToolRegistry::new();
        let err = registry.resolve(&call("nope", json!({}))).unwrap_err();
        assert!(matches!(err, LlmError::UnknownTool { name } if name == "nope"));
    }

    #[test]
    fn missing_argument_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(
            "get_date_transactions",
            vec!["start_time".to_string(), "end_time".to_string()],
            Arc::new(|_| Ok(String::new())),
        );

        let err = registry
            .resolve(&call("get_date_transactions", json!({"start_time": "20250301"})))
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::MissingToolArgument { param, .. } if param == "end_time"
        ));
    }

    #[test]
    fn handler_error_surfaces_as_backend_call() {
        let mut registry = ToolRegistry::new();
        registry.register(
            "broken",
            vec![],
            Arc::new(|_| Err(anyhow::anyhow!("db offline"))),
        );

        let err = registry.resolve(&call("broken", json!({}))).unwrap_err();
        assert!(matches!(err, LlmError::BackendCall { message } if message.contains("db offline")));
    }
}
