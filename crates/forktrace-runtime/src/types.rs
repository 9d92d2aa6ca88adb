use forktrace_types::ThinkingLevel;
use serde_json::Value;

/// Arguments to `/fork [--model <model>[/<level>]]`.
#[derive(Debug, Clone, Default)]
pub struct ForkArgs {
    pub model: Option<String>,
    pub thinking_level: Option<ThinkingLevel>,
}

/// `/toolset`'s multi-arg grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolsetOp {
    List,
    Add(String),
    Remove(String),
    Clear,
}

/// Metadata accompanying an assistant reply.
#[derive(Debug, Clone)]
pub struct AssistantMetadata {
    pub model: String,
    pub finish_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
    pub tool_calls: Vec<ToolCallDescriptor>,
}

/// A model-issued tool invocation, shaped for the `tool_call` event's
/// `data` field.
#[derive(Debug, Clone)]
pub struct ToolCallDescriptor {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Short human-readable description used as the event's `content`.
    pub description: String,
}

/// The executor's reply to one tool call, shaped for `tool_result`'s `data`
/// field.
#[derive(Debug, Clone)]
pub struct ToolResultDescriptor {
    pub tool_call_id: String,
    pub name: String,
    pub output: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    /// Short human-readable description used as the event's `content`.
    pub description: String,
}
