use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The tag of an [`Event`]. Modeled as a variant enum with an explicit
/// `Unknown` arm so rows written by a newer writer are preserved verbatim
/// during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Clear,
    System,
    User,
    Assistant,
    ToolCall,
    ToolResult,
    Mark,
    Rewind,
    Interrupted,
    AgentKilled,
    Command,
    Fork,
    /// Forward-compatible catch-all for kinds this build doesn't recognize.
    Unknown(String),
}

impl EventKind {
    /// The wire/db representation used by `messages.kind`.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Clear => "clear",
            EventKind::System => "system",
            EventKind::User => "user",
            EventKind::Assistant => "assistant",
            EventKind::ToolCall => "tool_call",
            EventKind::ToolResult => "tool_result",
            EventKind::Mark => "mark",
            EventKind::Rewind => "rewind",
            EventKind::Interrupted => "interrupted",
            EventKind::AgentKilled => "agent_killed",
            EventKind::Command => "command",
            EventKind::Fork => "fork",
            EventKind::Unknown(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "clear" => EventKind::Clear,
            "system" => EventKind::System,
            "user" => EventKind::User,
            "assistant" => EventKind::Assistant,
            "tool_call" => EventKind::ToolCall,
            "tool_result" => EventKind::ToolResult,
            "mark" => EventKind::Mark,
            "rewind" => EventKind::Rewind,
            "interrupted" => EventKind::Interrupted,
            "agent_killed" => EventKind::AgentKilled,
            "command" => EventKind::Command,
            "fork" => EventKind::Fork,
            other => EventKind::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atomic, immutable, totally-ordered record in the conversation log.
/// Called a "message" in the persisted schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic per session; defines total order.
    pub id: i64,
    pub session_id: i64,
    /// `None` for legacy session-scoped events with no owning agent.
    pub agent_uuid: Option<Uuid>,
    pub kind: EventKind,
    pub content: Option<String>,
    /// Structured side-channel payload (the schema's `jsonb` column).
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Convenience accessor for `data.label`, used by mark/rewind.
    pub fn data_label(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|v| v.get("label"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Convenience accessor for `data.target_message_id`, used by rewind.
    pub fn data_target_message_id(&self) -> Option<i64> {
        self.data
            .as_ref()
            .and_then(|v| v.get("target_message_id"))
            .and_then(|v| v.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for kind in [
            EventKind::Clear,
            EventKind::System,
            EventKind::User,
            EventKind::Assistant,
            EventKind::ToolCall,
            EventKind::ToolResult,
            EventKind::Mark,
            EventKind::Rewind,
            EventKind::Interrupted,
            EventKind::AgentKilled,
            EventKind::Command,
            EventKind::Fork,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_kind_preserved_verbatim() {
        let kind = EventKind::parse("future_kind");
        assert_eq!(kind, EventKind::Unknown("future_kind".to_string()));
        assert_eq!(kind.as_str(), "future_kind");
    }
}
