use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use forktrace_providers::{DebugLogSink, ScrollbackSink, ToolChoice};
use forktrace_replay::reduce;
use forktrace_store::{agents::PrefixLookup, Store};
use forktrace_types::{
    Agent, AgentStatus, Error, Event, EventKind, ModelCatalog, Result, ThinkingLevel,
};
use serde_json::json;
use uuid::Uuid;

use crate::agent_context::AgentContext;
use crate::config::Config;
use crate::types::{AssistantMetadata, ForkArgs, ToolCallDescriptor, ToolResultDescriptor, ToolsetOp};

/// The Conversation Core: owns the live per-agent message
/// lists, applies every operation the REPL and slash-command surface can
/// trigger, and fans writes through to the [`Store`]. Store failures
/// during a turn are logged and swallowed — the in-memory state
/// is always updated first and is authoritative for continuation.
pub struct ConversationCore {
    store: Store,
    config: Config,
    session_id: i64,
    current_agent: Uuid,
    agents: HashMap<Uuid, AgentContext>,
    /// Process-wide guard across interleaved command dispatch: a
    /// second `/fork` while one is in progress is a no-op.
    fork_pending: AtomicBool,
    /// Monotonically decreasing id handed to events that couldn't be
    /// durably assigned one because the store write failed. Never collides
    /// with a store-assigned id, which is always positive.
    memory_fallback_id: i64,
    scrollback: Box<dyn ScrollbackSink>,
    debug_log: Box<dyn DebugLogSink>,
}

impl ConversationCore {
    pub fn new(
        store: Store,
        config: Config,
        session_id: i64,
        root_uuid: Uuid,
        scrollback: Box<dyn ScrollbackSink>,
        debug_log: Box<dyn DebugLogSink>,
    ) -> Result<Self> {
        let mut core = Self {
            store,
            config,
            session_id,
            current_agent: root_uuid,
            agents: HashMap::new(),
            fork_pending: AtomicBool::new(false),
            memory_fallback_id: -1,
            scrollback,
            debug_log,
        };
        core.ensure_loaded(root_uuid)?;
        Ok(core)
    }

    pub fn current_agent(&self) -> Uuid {
        self.current_agent
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn ensure_loaded(&mut self, uuid: Uuid) -> Result<()> {
        if self.agents.contains_key(&uuid) {
            return Ok(());
        }
        let replay_ctx = forktrace_replay::replay(&self.store, self.session_id, uuid)?;
        let agent_row = self.store.get_agent(uuid)?;
        let mut ctx = AgentContext::new(uuid, replay_ctx);
        ctx.pinned_paths = agent_row.pinned_paths;
        ctx.toolset_filter = agent_row.toolset_filter;
        ctx.provider = agent_row.provider;
        ctx.model = agent_row.model;
        ctx.thinking_level = agent_row.thinking_level;
        if agent_row.status == AgentStatus::Dead {
            ctx.state = crate::state::AgentState::Dead;
        }
        self.agents.insert(uuid, ctx);
        Ok(())
    }

    fn current_mut(&mut self) -> &mut AgentContext {
        self.agents
            .get_mut(&self.current_agent)
            .expect("current agent is always loaded")
    }

    pub fn current(&self) -> &AgentContext {
        self.agents
            .get(&self.current_agent)
            .expect("current agent is always loaded")
    }

    fn next_fallback_id(&mut self) -> i64 {
        let id = self.memory_fallback_id;
        self.memory_fallback_id -= 1;
        id
    }

    /// Persists then folds one event into `agent_uuid`'s live state through
    /// the exact same reducer the Replay Engine uses. On a store failure
    /// the event still gets an id (a negative, session-local fallback) and
    /// is still applied to memory.
    fn emit(
        &mut self,
        agent_uuid: Uuid,
        kind: EventKind,
        content: Option<String>,
        data: Option<serde_json::Value>,
    ) -> Event {
        let id = match self.store.insert_event(
            self.session_id,
            Some(agent_uuid),
            &kind,
            content.as_deref(),
            data.as_ref(),
        ) {
            Ok(id) => id,
            Err(e) => {
                self.debug_log
                    .write(&format!("store write failed for {kind} event: {e}"));
                self.next_fallback_id()
            }
        };
        let event = Event {
            id,
            session_id: self.session_id,
            agent_uuid: Some(agent_uuid),
            kind,
            content,
            data,
            created_at: Utc::now(),
        };
        if let Some(ctx) = self.agents.get_mut(&agent_uuid) {
            reduce(&mut ctx.replay, event.clone());
        }
        event
    }

    // ---- Turn operations ----------------------------------

    pub fn submit_user(&mut self, text: &str) -> Result<()> {
        self.current_mut().state.on_submit_user()?;
        let agent = self.current_agent;
        let data = json!({
            "model": self.current().model.clone().unwrap_or_else(|| self.config.default_model.clone()),
            "temperature": self.config.default_temperature,
            "max_tokens": self.config.default_max_tokens,
        });
        self.emit(agent, EventKind::User, Some(text.to_string()), Some(data));
        let ctx = self.current_mut();
        ctx.tool_turns_in_flight = 0;
        ctx.force_tool_choice_none = false;
        Ok(())
    }

    pub fn on_assistant_reply(&mut self, text: Option<&str>, metadata: AssistantMetadata) -> Result<()> {
        let has_tool_calls = !metadata.tool_calls.is_empty();
        self.current_mut().state.on_assistant_reply(has_tool_calls)?;
        let agent = self.current_agent;
        let data = json!({
            "model": metadata.model,
            "finish_reason": metadata.finish_reason,
            "input_tokens": metadata.input_tokens,
            "output_tokens": metadata.output_tokens,
            "thinking_tokens": metadata.thinking_tokens,
        });
        self.emit(agent, EventKind::Assistant, text.map(|s| s.to_string()), Some(data));
        Ok(())
    }

    pub fn on_tool_call(&mut self, call: ToolCallDescriptor) -> Result<()> {
        let agent = self.current_agent;
        let data = json!({
            "id": call.id,
            "type": "function",
            "function": {"name": call.name, "arguments": call.arguments},
        });
        self.emit(agent, EventKind::ToolCall, Some(call.description), Some(data));
        self.current_mut().tool_turns_in_flight += 1;
        Ok(())
    }

    pub fn on_tool_result(&mut self, result: ToolResultDescriptor) -> Result<()> {
        let agent = self.current_agent;
        let max_turns = self.config.max_tool_turns;
        let limit_reached = self.current().tool_turns_in_flight >= max_turns;
        let mut data = json!({
            "tool_call_id": result.tool_call_id,
            "name": result.name,
            "output": result.output,
            "success": result.success,
            "error": result.error,
        });
        if limit_reached {
            data["limit_reached"] = json!(true);
            data["limit_message"] = json!("Tool call limit reached");
            self.current_mut().force_tool_choice_none = true;
        }
        self.emit(agent, EventKind::ToolResult, Some(result.description), Some(data));
        self.current_mut().state.on_tool_result()?;
        Ok(())
    }

    /// The `tool_choice` the next provider request for the current agent
    /// must use.
    pub fn next_tool_choice(&self) -> ToolChoice {
        if self.current().force_tool_choice_none {
            ToolChoice::None
        } else {
            ToolChoice::Auto
        }
    }

    // ---- Slash commands: conversation shape ---------------------------

    pub fn cmd_clear(&mut self) {
        let agent = self.current_agent;
        self.emit(agent, EventKind::Clear, None, None);
        if let Some(prompt) = self.config.system_prompt.clone() {
            self.emit(agent, EventKind::System, Some(prompt), None);
        }
    }

    pub fn cmd_mark(&mut self, label: Option<String>) -> i64 {
        let agent = self.current_agent;
        let data = label.as_ref().map(|l| json!({"label": l}));
        let event = self.emit(agent, EventKind::Mark, None, data);
        event.id
    }

    pub fn cmd_rewind(&mut self, label: Option<String>) -> Result<()> {
        let target = {
            let stack = &self.current().replay.mark_stack;
            match &label {
                Some(label) => stack
                    .iter()
                    .rev()
                    .find(|m| m.label.as_deref() == Some(label.as_str()))
                    .map(|m| m.message_id),
                None => stack.last().map(|m| m.message_id),
            }
        };
        let Some(target_id) = target else {
            return Err(Error::protocol("no marks available to rewind to"));
        };
        let agent = self.current_agent;
        let data = json!({"target_message_id": target_id, "label": label.clone()});
        self.emit(agent, EventKind::Rewind, label, Some(data));
        Ok(())
    }

    pub fn cmd_system(&mut self, text: Option<String>) {
        self.config.system_prompt = text;
    }

    // ---- Slash commands: agent lifecycle -------------------------------

    pub fn cmd_fork(&mut self, args: ForkArgs) -> Result<Uuid> {
        if self
            .fork_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::protocol("Fork already in progress"));
        }

        let result = self.do_fork(args);
        self.fork_pending.store(false, Ordering::SeqCst);
        result
    }

    fn do_fork(&mut self, args: ForkArgs) -> Result<Uuid> {
        let parent = self.current_agent;
        let fork_message_id = self.store.last_id(self.session_id, parent)?;
        let child_uuid = Uuid::new_v4();
        let mut child = Agent::new_child(child_uuid, parent, fork_message_id, Utc::now());

        if let Some(model) = &args.model {
            child.provider = Some(ModelCatalog::provider_for(model).to_string());
            child.model = Some(model.clone());
        } else {
            child.provider = self.current().provider.clone();
            child.model = self.current().model.clone();
        }
        if let Some(level) = args.thinking_level {
            child.thinking_level = Some(level.as_str().to_string());
        }

        if let Err(e) = self.store.insert_agent(&child) {
            return Err(e);
        }

        let data = json!({"parent_uuid": parent, "child_uuid": child_uuid});
        let fork_event_id = match self.store.insert_event(
            self.session_id,
            Some(parent),
            &EventKind::Fork,
            None,
            Some(&data),
        ) {
            Ok(id) => id,
            Err(e) => {
                // Roll back the child row: the fork must be all-or-nothing.
                let _ = self.store.delete_agent(child_uuid);
                return Err(e);
            }
        };
        // Mirror the fork event into the parent's live memory too.
        if let Some(parent_ctx) = self.agents.get_mut(&parent) {
            let event = Event {
                id: fork_event_id,
                session_id: self.session_id,
                agent_uuid: Some(parent),
                kind: EventKind::Fork,
                content: None,
                data: Some(data),
                created_at: Utc::now(),
            };
            reduce(&mut parent_ctx.replay, event);
        }

        if let Some(model) = &args.model {
            let supports = args
                .thinking_level
                .map(|level| ModelCatalog::supports_thinking(model, level))
                .unwrap_or(true);
            if !supports {
                self.scrollback.append_line(&format!(
                    "Warning: model {model} does not support the requested thinking level"
                ));
            } else if let Some(level) = args.thinking_level {
                if level != ThinkingLevel::None {
                    self.scrollback.append_line(&format!(
                        "Thinking level set to {}",
                        ModelCatalog::describe_thinking(model, level)
                    ));
                }
            }
        }

        self.ensure_loaded(child_uuid)?;
        self.current_agent = child_uuid;
        Ok(child_uuid)
    }

    pub fn cmd_kill(&mut self, target_uuid: Option<Uuid>, cascade: bool) -> Result<()> {
        let target = target_uuid.unwrap_or(self.current_agent);
        let target_agent = self.store.get_agent(target)?;

        if target_agent.is_root() && !cascade {
            return Err(Error::protocol("Root cannot be killed"));
        }

        let killer = self.current_agent;
        if cascade {
            let descendants = self.store.descendants_of(target)?;
            for agent in &descendants {
                self.store.mark_dead(agent.uuid)?;
                if let Some(ctx) = self.agents.get_mut(&agent.uuid) {
                    ctx.state.on_kill();
                }
            }
            self.store.mark_dead(target)?;
            if let Some(ctx) = self.agents.get_mut(&target) {
                ctx.state.on_kill();
            }
            let data = json!({"cascade": true, "count": descendants.len() + 1});
            self.emit(killer, EventKind::AgentKilled, None, Some(data));
        } else {
            self.store.mark_dead(target)?;
            if let Some(ctx) = self.agents.get_mut(&target) {
                ctx.state.on_kill();
            }
            let data = json!({"cascade": false});
            self.emit(killer, EventKind::AgentKilled, None, Some(data));
        }
        Ok(())
    }

    pub fn cmd_model(&mut self, model: String, level: Option<ThinkingLevel>) -> Result<()> {
        self.current().state.require_idle_for_model_switch()?;
        let provider = ModelCatalog::provider_for(&model).to_string();
        if let Some(level) = level {
            if !ModelCatalog::supports_thinking(&model, level) {
                self.scrollback.append_line(&format!(
                    "Warning: model {model} does not support thinking level {}",
                    level.as_str()
                ));
            } else if level != ThinkingLevel::None {
                self.scrollback.append_line(&format!(
                    "Thinking level set to {}",
                    ModelCatalog::describe_thinking(&model, level)
                ));
            }
        }
        let ctx = self.current_mut();
        ctx.provider = Some(provider);
        ctx.model = Some(model);
        ctx.thinking_level = level.map(|l| l.as_str().to_string());
        self.persist_agent_config()
    }

    fn persist_agent_config(&mut self) -> Result<()> {
        let uuid = self.current_agent;
        let ctx = self.current();
        let mut row = self.store.get_agent(uuid)?;
        row.provider = ctx.provider.clone();
        row.model = ctx.model.clone();
        row.thinking_level = ctx.thinking_level.clone();
        row.pinned_paths = ctx.pinned_paths.clone();
        row.toolset_filter = ctx.toolset_filter.clone();
        self.store.update_agent_config(&row)
    }

    // ---- Slash commands: pin / toolset ---------------------------------

    pub fn cmd_pin(&mut self, path: String) -> Result<()> {
        let ctx = self.current_mut();
        if !ctx.pinned_paths.contains(&path) {
            ctx.pinned_paths.push(path);
        }
        self.persist_agent_config()
    }

    pub fn cmd_unpin(&mut self, path: &str) -> Result<()> {
        self.current_mut().pinned_paths.retain(|p| p != path);
        self.persist_agent_config()
    }

    pub fn cmd_toolset(&mut self, op: ToolsetOp) -> Result<Vec<String>> {
        match op {
            ToolsetOp::List => {}
            ToolsetOp::Add(name) => {
                let ctx = self.current_mut();
                if !ctx.toolset_filter.contains(&name) {
                    ctx.toolset_filter.push(name);
                }
                self.persist_agent_config()?;
            }
            ToolsetOp::Remove(name) => {
                self.current_mut().toolset_filter.retain(|t| *t != name);
                self.persist_agent_config()?;
            }
            ToolsetOp::Clear => {
                self.current_mut().toolset_filter.clear();
                self.persist_agent_config()?;
            }
        }
        Ok(self.current().toolset_filter.clone())
    }

    // ---- Slash commands: mail -------------------------------------------

    pub fn cmd_send(&mut self, to: &str, body: &str) -> Result<i64> {
        let recipient = self.resolve_agent_ref(to)?;
        let from = self.current_agent;
        self.store
            .send_mail(self.session_id, from, recipient, body, Utc::now().timestamp())
    }

    pub fn cmd_check_mail(&self) -> Result<Vec<forktrace_types::Mail>> {
        self.store.inbox(self.session_id, self.current_agent)
    }

    pub fn cmd_filter_mail(&self, from: &str) -> Result<Vec<forktrace_types::Mail>> {
        let from_uuid = self.resolve_agent_ref(from)?;
        self.store.inbox_filtered(self.session_id, self.current_agent, from_uuid)
    }

    pub fn cmd_read_mail(&mut self, index: usize) -> Result<forktrace_types::Mail> {
        let inbox = self.cmd_check_mail()?;
        let mail = inbox
            .get(index.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| Error::referential_integrity(format!("no mail at index {index}")))?;
        self.store.mark_mail_read(mail.id)?;
        Ok(mail)
    }

    pub fn cmd_delete_mail(&mut self, index: usize) -> Result<()> {
        let inbox = self.cmd_check_mail()?;
        let mail = inbox
            .get(index.wrapping_sub(1))
            .ok_or_else(|| Error::referential_integrity(format!("no mail at index {index}")))?;
        self.store.delete_mail(mail.id, self.current_agent)
    }

    fn resolve_agent_ref(&self, prefix: &str) -> Result<Uuid> {
        match self.store.find_by_prefix(prefix)? {
            PrefixLookup::Exact(agent) => Ok(agent.uuid),
            PrefixLookup::Ambiguous => Err(Error::referential_integrity(format!(
                "ambiguous agent prefix '{prefix}'"
            ))),
            PrefixLookup::NotFound => {
                Err(Error::referential_integrity(format!("no running agent matches '{prefix}'")))
            }
        }
    }
}

// Re-exported so callers (the CLI) don't need to depend on forktrace-store
// directly just to match on `PrefixLookup`.
pub use forktrace_store::agents::PrefixLookup as AgentPrefixLookup;
