use async_trait::async_trait;
use forktrace_types::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The executor's reply to a single `dispatch` call. The core
/// does not interpret `output` beyond surfacing it in a `tool_result` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: Option<String>,
    pub exit_code: Option<i32>,
    pub count: Option<i64>,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            exit_code: None,
            count: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            exit_code: None,
            count: None,
            error: Some(error.into()),
        }
    }
}

/// The tool executor, kept entirely as an external collaborator: the
/// conversation engine calls through this trait and never inspects a
/// command's implementation.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<ToolOutcome>;
}
