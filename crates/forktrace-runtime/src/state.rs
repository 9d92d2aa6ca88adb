use forktrace_types::{Error, Result};

/// Per-agent turn state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    WaitingForLlm,
    AwaitingToolResult,
    Dead,
}

impl AgentState {
    pub fn is_idle(&self) -> bool {
        matches!(self, AgentState::Idle)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, AgentState::Dead)
    }

    /// `Idle -> WaitingForLlm` on `submit_user`.
    pub fn on_submit_user(&mut self) -> Result<()> {
        match self {
            AgentState::Idle => {
                *self = AgentState::WaitingForLlm;
                Ok(())
            }
            AgentState::Dead => Err(Error::protocol("agent is dead")),
            _ => Err(Error::protocol("cannot submit user input while a turn is in flight")),
        }
    }

    /// `WaitingForLlm -> Idle` (no tool calls) or `WaitingForLlm ->
    /// AwaitingToolResult` (tool calls present).
    pub fn on_assistant_reply(&mut self, has_tool_calls: bool) -> Result<()> {
        match self {
            AgentState::WaitingForLlm => {
                *self = if has_tool_calls {
                    AgentState::AwaitingToolResult
                } else {
                    AgentState::Idle
                };
                Ok(())
            }
            _ => Err(Error::protocol("assistant reply received outside WaitingForLlm")),
        }
    }

    /// `AwaitingToolResult -> WaitingForLlm` on each tool result, until the
    /// model closes the loop with a text-only reply.
    pub fn on_tool_result(&mut self) -> Result<()> {
        match self {
            AgentState::AwaitingToolResult => {
                *self = AgentState::WaitingForLlm;
                Ok(())
            }
            _ => Err(Error::protocol("tool result received outside AwaitingToolResult")),
        }
    }

    /// `* -> Dead` unconditionally.
    pub fn on_kill(&mut self) {
        *self = AgentState::Dead;
    }

    /// Model switches are rejected while not `Idle`.
    pub fn require_idle_for_model_switch(&self) -> Result<()> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(Error::protocol("model cannot change while a turn is in flight"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_turn_without_tools() {
        let mut s = AgentState::Idle;
        s.on_submit_user().unwrap();
        assert_eq!(s, AgentState::WaitingForLlm);
        s.on_assistant_reply(false).unwrap();
        assert_eq!(s, AgentState::Idle);
    }

    #[test]
    fn tool_loop_returns_to_idle_on_text_only_close() {
        let mut s = AgentState::Idle;
        s.on_submit_user().unwrap();
        s.on_assistant_reply(true).unwrap();
        assert_eq!(s, AgentState::AwaitingToolResult);
        s.on_tool_result().unwrap();
        assert_eq!(s, AgentState::WaitingForLlm);
        s.on_assistant_reply(true).unwrap();
        assert_eq!(s, AgentState::AwaitingToolResult);
        s.on_tool_result().unwrap();
        s.on_assistant_reply(false).unwrap();
        assert_eq!(s, AgentState::Idle);
    }

    #[test]
    fn model_switch_rejected_outside_idle() {
        let mut s = AgentState::Idle;
        s.on_submit_user().unwrap();
        assert!(s.require_idle_for_model_switch().is_err());
    }

    #[test]
    fn kill_is_reachable_from_any_state() {
        for mut s in [
            AgentState::Idle,
            AgentState::WaitingForLlm,
            AgentState::AwaitingToolResult,
        ] {
            s.on_kill();
            assert_eq!(s, AgentState::Dead);
        }
    }
}
