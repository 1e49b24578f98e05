//! Persistence collaborator interface and the date-range tool backed
//! by it

use std::sync::Arc;

use finbot_llm::{AiManager, ToolHandler, ToolSpec};
use serde_json::json;

use crate::records::TransactionRecord;

/// Name of the tool backends use to request transaction data
pub const TRANSACTIONS_TOOL: &str = "get_date_transactions";

/// Query surface of the persistence service. Synchronous: tool
/// callbacks run to completion before the follow-up request is issued.
pub trait TransactionStore: Send + Sync {
    /// Records with a transaction time inside the inclusive
    /// `YYYYMMDD` day range
    fn transactions_in_range(
        &self,
        start: &str,
        end: &str,
    ) -> anyhow::Result<Vec<TransactionRecord>>;
}

/// Tool declaration sent to backends alongside analysis queries
pub fn transactions_tool_spec() -> ToolSpec {
    ToolSpec::new(
        TRANSACTIONS_TOOL,
        "Fetch transaction records within a date range",
        json!({
            "type": "object",
            "properties": {
                "start_time": {
                    "type": "string",
                    "description": "Start of the range, formatted YYYYMMDD, e.g. 20250301",
                },
                "end_time": {
                    "type": "string",
                    "description": "End of the range, formatted YYYYMMDD, e.g. 20250310",
                }
            },
            "required": ["start_time", "end_time"],
        }),
    )
}

/// Callback answering [`TRANSACTIONS_TOOL`] from a store; the records
/// are serialized to JSON for the backend
pub fn transactions_tool_handler(store: Arc<dyn TransactionStore>) -> ToolHandler {
    Arc::new(move |args| {
        let start = args
            .first()
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("start_time must be a string"))?;
        let end = args
            .get(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("end_time must be a string"))?;

        let records = store.transactions_in_range(start, end)?;
        Ok(serde_json::to_string(&records)?)
    })
}

/// Register the date-range transactions tool on a manager
pub fn register_transactions_tool(manager: &mut AiManager, store: Arc<dyn TransactionStore>) {
    manager.register_tool(
        TRANSACTIONS_TOOL,
        vec!["start_time".to_string(), "end_time".to_string()],
        transactions_tool_handler(store),
    );
}
