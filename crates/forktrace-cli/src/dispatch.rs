//! The slash-command dispatcher: parses one line of REPL input and drives
//! [`forktrace_runtime::ConversationCore`] plus the (stub) provider/tool
//! collaborators. Both the tokenizer here and the provider/tool plumbing
//! are explicitly out of scope for the engine itself; this is a
//! demonstration-quality stand-in, not a conformance surface.

use std::sync::Arc;

use forktrace_providers::stub::{EchoProvider, RecordingToolExecutor};
use forktrace_providers::{ProviderAdapter, ProviderRequest, ToolCatalogEntry, ToolExecutor};
use forktrace_runtime::types::{AssistantMetadata, ForkArgs, ToolCallDescriptor, ToolResultDescriptor, ToolsetOp};
use forktrace_sdk::Engine;
use forktrace_types::{Error, EventKind, Result, ThinkingLevel};
use uuid::Uuid;

use crate::humanize::relative_timestamp;

/// Owns the engine plus the stub collaborators a real deployment would
/// replace with HTTP provider adapters and a sandboxed tool executor.
pub struct Session {
    pub engine: Engine,
    provider: Arc<dyn ProviderAdapter>,
    tools: Arc<dyn ToolExecutor>,
    rt: tokio::runtime::Runtime,
    pub should_exit: bool,
}

impl Session {
    pub fn new(engine: Engine) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| Error::io(e.to_string()))?;
        Ok(Self {
            engine,
            provider: Arc::new(EchoProvider::default()),
            tools: Arc::new(RecordingToolExecutor::default()),
            rt,
            should_exit: false,
        })
    }

    /// One line of input: either a slash command, or plain text that
    /// starts a new turn.
    pub fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let result = if let Some(rest) = line.strip_prefix('/') {
            self.dispatch_command(rest)
        } else {
            self.run_turn(line)
        };
        if let Err(e) = result {
            self.say(&format!("Error: {e}"));
        }
    }

    fn say(&self, text: &str) {
        println!("{text}");
    }

    // ---- Turn loop ------------------------------------

    fn run_turn(&mut self, text: &str) -> Result<()> {
        self.engine.conversation_mut().submit_user(text)?;
        loop {
            let messages = self.provider_messages();
            let tool_choice = self.engine.conversation().next_tool_choice();
            let model = self
                .engine
                .conversation()
                .current()
                .model
                .clone()
                .unwrap_or_else(|| "claude-sonnet-4-5".to_string());
            let thinking = self
                .engine
                .conversation()
                .current()
                .thinking_level
                .clone()
                .unwrap_or_else(|| "none".to_string());
            let catalog: Vec<ToolCatalogEntry> = Vec::new();
            let provider = self.provider.clone();
            let reply = self
                .rt
                .block_on(provider.start_request(&messages, &catalog, &tool_choice, &model, &thinking))?;

            let tool_calls = reply.tool_calls.clone();
            self.engine.conversation_mut().on_assistant_reply(
                reply.assistant_text.as_deref(),
                AssistantMetadata {
                    model: reply.model,
                    finish_reason: reply.finish_reason,
                    input_tokens: reply.input_tokens,
                    output_tokens: reply.output_tokens,
                    thinking_tokens: reply.thinking_tokens,
                    tool_calls: tool_calls
                        .iter()
                        .map(|c| ToolCallDescriptor {
                            id: c.id.clone(),
                            name: c.name.clone(),
                            arguments: c.arguments.clone(),
                            description: format!("call {}", c.name),
                        })
                        .collect(),
                },
            )?;

            if let Some(text) = &reply.assistant_text {
                if tool_calls.is_empty() {
                    println!("{text}");
                }
            }
            if tool_calls.is_empty() {
                break;
            }

            for call in tool_calls {
                self.engine.conversation_mut().on_tool_call(ToolCallDescriptor {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    description: format!("call {}", call.name),
                })?;
                let tools = self.tools.clone();
                let outcome = self.rt.block_on(tools.dispatch(&call.name, &call.arguments))?;
                self.engine.conversation_mut().on_tool_result(ToolResultDescriptor {
                    tool_call_id: call.id,
                    name: call.name,
                    output: outcome.output,
                    success: outcome.success,
                    error: outcome.error,
                    description: "tool result".to_string(),
                })?;
            }
        }
        Ok(())
    }

    fn provider_messages(&self) -> Vec<ProviderRequest> {
        self.engine
            .conversation()
            .current()
            .replay
            .messages
            .iter()
            .filter_map(|e| {
                let role = match e.kind {
                    EventKind::System => "system",
                    EventKind::User => "user",
                    EventKind::Assistant => "assistant",
                    EventKind::ToolCall | EventKind::ToolResult => "tool",
                    _ => return None,
                };
                Some(ProviderRequest {
                    role: role.to_string(),
                    content: e.content.clone().unwrap_or_default(),
                })
            })
            .collect()
    }

    // ---- Slash commands ------------------------------------

    fn dispatch_command(&mut self, rest: &str) -> Result<()> {
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match name {
            "clear" => {
                self.engine.conversation_mut().cmd_clear();
                self.say("Context cleared.");
            }
            "mark" => {
                let label = args.first().map(|s| s.to_string());
                let id = self.engine.conversation_mut().cmd_mark(label.clone());
                self.say(&format!("Marked #{id}{}", label.map(|l| format!(" ({l})")).unwrap_or_default()));
            }
            "rewind" => {
                let label = args.first().map(|s| s.to_string());
                self.engine.conversation_mut().cmd_rewind(label)?;
                self.say("Rewound.");
            }
            "fork" => {
                let fork_args = parse_fork_args(&args)?;
                let child = self.engine.conversation_mut().cmd_fork(fork_args)?;
                self.say(&format!("Forked to {child}"));
            }
            "kill" => {
                let cascade = args.iter().any(|a| *a == "--cascade");
                let target = args
                    .iter()
                    .find(|a| !a.starts_with("--"))
                    .map(|s| parse_uuid(s))
                    .transpose()?;
                self.engine.conversation_mut().cmd_kill(target, cascade)?;
                self.say("Killed.");
            }
            "send" => {
                let to = args.first().ok_or_else(|| Error::parse("usage: /send <uuid> \"message\""))?;
                let body = rest_after(rest, 2);
                if body.is_empty() {
                    return Err(Error::parse("mail body must not be empty"));
                }
                self.engine.conversation_mut().cmd_send(to, &body)?;
                self.say("Sent.");
            }
            "check-mail" => {
                let inbox = self.engine.conversation().cmd_check_mail()?;
                self.print_inbox(&inbox);
            }
            "read-mail" => {
                let index = parse_index(&args)?;
                let mail = self.engine.conversation_mut().cmd_read_mail(index)?;
                self.say(&mail.body);
            }
            "delete-mail" => {
                let index = parse_index(&args)?;
                self.engine.conversation_mut().cmd_delete_mail(index)?;
                self.say("Deleted.");
            }
            "filter-mail" => {
                let from = args
                    .iter()
                    .position(|a| *a == "--from")
                    .and_then(|i| args.get(i + 1))
                    .ok_or_else(|| Error::parse("usage: /filter-mail --from <uuid>"))?;
                let inbox = self.engine.conversation().cmd_filter_mail(from)?;
                self.print_inbox(&inbox);
            }
            "agents" => self.print_agent_tree()?,
            "help" => self.print_help(),
            "model" => {
                let spec = args.first().ok_or_else(|| Error::parse("usage: /model <model>[/<level>]"))?;
                let (model, level) = parse_model_spec(spec)?;
                self.engine.conversation_mut().cmd_model(model, level)?;
                self.say("Model switched.");
            }
            "system" => {
                let text = if args.is_empty() { None } else { Some(args.join(" ")) };
                self.engine.conversation_mut().cmd_system(text);
                self.say("System prompt updated.");
            }
            "pin" => {
                let path = args.first().ok_or_else(|| Error::parse("usage: /pin <path>"))?;
                self.engine.conversation_mut().cmd_pin(path.to_string())?;
                self.say(&format!("Pinned {path}"));
            }
            "unpin" => {
                let path = args.first().ok_or_else(|| Error::parse("usage: /unpin <path>"))?;
                self.engine.conversation_mut().cmd_unpin(path)?;
                self.say(&format!("Unpinned {path}"));
            }
            "toolset" => {
                let op = parse_toolset_op(&args)?;
                let filter = self.engine.conversation_mut().cmd_toolset(op)?;
                self.say(&format!("Toolset: {}", filter.join(", ")));
            }
            "exit" | "quit" => {
                self.provider.abort();
                self.should_exit = true;
            }
            other => return Err(Error::parse(format!("unknown command: /{other}"))),
        }
        Ok(())
    }

    fn print_inbox(&self, inbox: &[forktrace_types::Mail]) {
        if inbox.is_empty() {
            self.say("(no mail)");
            return;
        }
        for (i, mail) in inbox.iter().enumerate() {
            let marker = if mail.read { " " } else { "*" };
            self.say(&format!(
                "{}{}. from {} ({}): {}",
                marker,
                i + 1,
                mail.from_uuid,
                relative_timestamp(mail.timestamp),
                mail.body
            ));
        }
    }

    fn print_agent_tree(&self) -> Result<()> {
        let agents = self.engine.all_agents()?;
        let current = self.engine.conversation().current_agent();
        for agent in agents {
            let marker = if agent.uuid == current { "*" } else { " " };
            let status = if agent.status == forktrace_types::AgentStatus::Dead {
                "dead"
            } else {
                "running"
            };
            self.say(&format!("{marker} {} [{status}]", agent.uuid));
        }
        Ok(())
    }

    fn print_help(&self) {
        for (cmd, desc) in COMMAND_TABLE {
            self.say(&format!("/{cmd:<12} {desc}"));
        }
    }
}

/// Static table used both for `/help` rendering and as documentation of
/// the dispatcher's surface.
const COMMAND_TABLE: &[(&str, &str)] = &[
    ("clear", "reset the conversation and mark stack"),
    ("mark", "push a checkpoint onto the mark stack"),
    ("rewind", "truncate back to the most recent matching mark"),
    ("fork", "create a child agent and switch to it"),
    ("kill", "mark an agent dead, optionally cascading to its subtree"),
    ("send", "send mail to another agent"),
    ("check-mail", "list this agent's inbox"),
    ("read-mail", "show a mail body by 1-based index"),
    ("delete-mail", "delete a mail by 1-based index"),
    ("filter-mail", "list inbox filtered by sender"),
    ("agents", "print the agent tree"),
    ("help", "list available commands"),
    ("model", "switch provider/model/thinking level"),
    ("system", "set or clear the system prompt"),
    ("pin", "pin a path for this agent"),
    ("unpin", "unpin a path for this agent"),
    ("toolset", "manage this agent's toolset filter"),
    ("exit", "quit and abort in-flight providers"),
];

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::parse(format!("invalid uuid '{s}': {e}")))
}

fn parse_index(args: &[&str]) -> Result<usize> {
    args.first()
        .ok_or_else(|| Error::parse("expected a 1-based index"))?
        .parse::<usize>()
        .map_err(|e| Error::parse(e.to_string()))
}

fn parse_fork_args(args: &[&str]) -> Result<ForkArgs> {
    let mut out = ForkArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "--model" {
            let spec = iter
                .next()
                .ok_or_else(|| Error::parse("--model requires a value"))?;
            let (model, level) = parse_model_spec(spec)?;
            out.model = Some(model);
            out.thinking_level = level;
        }
    }
    Ok(out)
}

fn parse_model_spec(spec: &str) -> Result<(String, Option<ThinkingLevel>)> {
    match spec.split_once('/') {
        Some((model, level)) => {
            let level = ThinkingLevel::parse(level)
                .ok_or_else(|| Error::parse(format!("unknown thinking level '{level}'")))?;
            Ok((model.to_string(), Some(level)))
        }
        None => Ok((spec.to_string(), None)),
    }
}

fn parse_toolset_op(args: &[&str]) -> Result<ToolsetOp> {
    match args.first().copied() {
        None | Some("list") => Ok(ToolsetOp::List),
        Some("clear") => Ok(ToolsetOp::Clear),
        Some("add") => {
            let name = args.get(1).ok_or_else(|| Error::parse("usage: /toolset add <name>"))?;
            Ok(ToolsetOp::Add(name.to_string()))
        }
        Some("remove") => {
            let name = args.get(1).ok_or_else(|| Error::parse("usage: /toolset remove <name>"))?;
            Ok(ToolsetOp::Remove(name.to_string()))
        }
        Some(other) => Err(Error::parse(format!("unknown /toolset subcommand '{other}'"))),
    }
}

/// Everything in `rest` after the `skip`-th whitespace-delimited token,
/// quotes stripped if the remainder is wrapped in `"..."`. Good enough for
/// `/send <uuid> "message"` — the real tokenizer lives outside this crate.
fn rest_after(rest: &str, skip: usize) -> String {
    let mut remaining = rest;
    for _ in 0..skip {
        remaining = match remaining.trim_start().split_once(char::is_whitespace) {
            Some((_, after)) => after,
            None => "",
        };
    }
    let trimmed = remaining.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}
