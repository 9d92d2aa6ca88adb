use async_trait::async_trait;
use forktrace_types::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the model should be steered towards (or away from) tool use, per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolChoice {
    Auto,
    Required,
    None,
    Named(String),
}

/// A catalog entry describing one callable tool, shaped the way a provider
/// adapter expects to serialize it into its own wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCatalogEntry {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
}

/// A chat-shaped message handed to `start_request`. The engine only needs
/// role + text; richer per-provider shaping happens on the far side of this
/// trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub role: String,
    pub content: String,
}

/// A model-issued tool invocation, as returned by `start_request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// The normalized reply from a single provider round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReply {
    pub assistant_text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
}

/// Per-agent provider adapter. A real implementation talks to
/// OpenAI/Anthropic/Google over HTTP; the engine only ever calls through
/// this trait.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn start_request(
        &self,
        messages: &[ProviderRequest],
        tool_catalog: &[ToolCatalogEntry],
        tool_choice: &ToolChoice,
        model: &str,
        thinking_level: &str,
    ) -> Result<ProviderReply>;

    /// Abort any in-flight request. Called on `/exit`; must not block.
    fn abort(&self);
}
