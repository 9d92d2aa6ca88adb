use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an [`Agent`]. A dead agent never transitions back to
/// running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Running,
    Dead,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Running => "running",
            AgentStatus::Dead => "dead",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(AgentStatus::Running),
            "dead" => Some(AgentStatus::Dead),
            _ => None,
        }
    }
}

/// A conversational persona with at most one parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub parent_uuid: Option<Uuid>,
    /// The event id in the parent's stream at which this agent was forked.
    /// `0` for root agents.
    pub fork_message_id: i64,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub thinking_level: Option<String>,
    pub pinned_paths: Vec<String>,
    pub toolset_filter: Vec<String>,
}

impl Agent {
    pub fn new_root(uuid: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            uuid,
            name: None,
            parent_uuid: None,
            fork_message_id: 0,
            status: AgentStatus::Running,
            created_at,
            ended_at: None,
            provider: None,
            model: None,
            thinking_level: None,
            pinned_paths: Vec::new(),
            toolset_filter: Vec::new(),
        }
    }

    pub fn new_child(
        uuid: Uuid,
        parent_uuid: Uuid,
        fork_message_id: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid,
            name: None,
            parent_uuid: Some(parent_uuid),
            fork_message_id,
            status: AgentStatus::Running,
            created_at,
            ended_at: None,
            provider: None,
            model: None,
            thinking_level: None,
            pinned_paths: Vec::new(),
            toolset_filter: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid.is_none()
    }

    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }
}
