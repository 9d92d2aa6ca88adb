//! Trait contracts for the collaborators the conversation engine consumes.
//! None of these traits are implemented against a real network provider
//! here — the HTTP clients, tool sandboxes, and terminal renderer are
//! external collaborators out of scope for this crate. What lives here is
//! the boundary the engine programs against, plus small stub
//! implementations used by tests and the demonstration CLI.

mod provider;
mod tools;
mod sinks;
pub mod stub;

pub use provider::{
    ProviderAdapter, ProviderReply, ProviderRequest, ToolCall, ToolCatalogEntry, ToolChoice,
};
pub use sinks::{DebugLogSink, NoopDebugLogSink, ScrollbackSink};
pub use tools::{ToolExecutor, ToolOutcome};
