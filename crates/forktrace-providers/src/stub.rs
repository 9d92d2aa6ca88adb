//! Small stand-ins for the real collaborators, used by tests and by
//! `forktrace-cli`'s demonstration REPL. None of these talk to a network;
//! the HTTP provider clients and sandboxed tool executor are genuinely out
//! of scope for this crate.

use async_trait::async_trait;
use forktrace_types::Result;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::provider::{ProviderAdapter, ProviderReply, ProviderRequest, ToolCatalogEntry, ToolChoice};
use crate::sinks::{DebugLogSink, ScrollbackSink};
use crate::tools::{ToolExecutor, ToolOutcome};

/// A provider adapter that echoes the last user message back as the
/// assistant reply and never issues tool calls. Useful for exercising the
/// turn state machine without a network.
pub struct EchoProvider {
    aborted: AtomicBool,
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self {
            aborted: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ProviderAdapter for EchoProvider {
    async fn start_request(
        &self,
        messages: &[ProviderRequest],
        _tool_catalog: &[ToolCatalogEntry],
        _tool_choice: &ToolChoice,
        model: &str,
        _thinking_level: &str,
    ) -> Result<ProviderReply> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ProviderReply {
            assistant_text: Some(format!("echo: {last_user}")),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
            model: model.to_string(),
            input_tokens: 0,
            output_tokens: 0,
            thinking_tokens: 0,
        })
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }
}

/// A tool executor that always succeeds with an empty output, recording
/// invocations for assertions.
#[derive(Default)]
pub struct RecordingToolExecutor {
    pub calls: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl ToolExecutor for RecordingToolExecutor {
    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<ToolOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        Ok(ToolOutcome::ok(""))
    }
}

/// A sink that appends every line to an in-memory buffer, for tests that
/// want to assert on exact scrollback output.
#[derive(Default)]
pub struct RecordingScrollbackSink {
    pub lines: Mutex<Vec<String>>,
}

impl ScrollbackSink for RecordingScrollbackSink {
    fn append_line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }
}

/// Debug sink that forwards to `tracing::warn!`, the default for a real
/// deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDebugLogSink;

impl DebugLogSink for TracingDebugLogSink {
    fn write(&self, line: &str) {
        tracing::warn!(target: "forktrace", "{line}");
    }
}
