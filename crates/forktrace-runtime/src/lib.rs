//! The Conversation Core: per-agent state machine, command
//! handlers, and the fork/kill/mail orchestration wired over the event
//! store and replay engine.

mod agent_context;
pub mod config;
mod conversation;
mod state;
pub mod types;

pub use agent_context::AgentContext;
pub use config::Config;
pub use conversation::{AgentPrefixLookup, ConversationCore};
pub use state::AgentState;
