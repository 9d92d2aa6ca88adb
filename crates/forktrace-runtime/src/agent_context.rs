use forktrace_replay::ReplayContext;
use uuid::Uuid;

use crate::state::AgentState;

/// Everything the Conversation Core keeps in memory for one agent.
/// `replay` holds the live message list and mark stack; command handlers
/// fold new events into it through the exact same reducer
/// (`forktrace_replay::reduce`) that rebuilds it from scratch on first
/// touch, so live state and a fresh replay can never diverge in behavior.
pub struct AgentContext {
    pub uuid: Uuid,
    pub replay: ReplayContext,
    pub pinned_paths: Vec<String>,
    pub toolset_filter: Vec<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub thinking_level: Option<String>,
    pub state: AgentState,
    /// Tool calls issued in the current, still-open turn. Reset on
    /// `submit_user`; consulted against `Config::max_tool_turns`.
    pub tool_turns_in_flight: u32,
    /// Set once `max_tool_turns` is exceeded; the next provider request for
    /// this agent must use `tool_choice: none`.
    pub force_tool_choice_none: bool,
}

impl AgentContext {
    pub fn new(uuid: Uuid, replay: ReplayContext) -> Self {
        Self {
            uuid,
            replay,
            pinned_paths: Vec::new(),
            toolset_filter: Vec::new(),
            provider: None,
            model: None,
            thinking_level: None,
            state: AgentState::Idle,
            tool_turns_in_flight: 0,
            force_tool_choice_none: false,
        }
    }
}
