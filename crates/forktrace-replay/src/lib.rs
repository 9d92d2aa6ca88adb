//! The replay engine: reconstructs an agent's in-memory conversational
//! context from the event log by walking its ancestry backwards to find the
//! ranges of history it can observe, then playing those ranges forward
//! through a stateful reducer.

mod range;
mod reduce;

pub use range::{build_replay_ranges, ReplayRange};
pub use reduce::reduce;

use forktrace_store::Store;
use forktrace_types::{Event, Mark, Result};
use uuid::Uuid;

/// The product of a replay: an ordered message list plus the mark stack
/// live at the end of it.
#[derive(Debug, Default)]
pub struct ReplayContext {
    pub messages: Vec<Event>,
    pub mark_stack: Vec<Mark>,
}

impl ReplayContext {
    pub fn new() -> Self {
        Self {
            messages: Vec::with_capacity(16),
            mark_stack: Vec::with_capacity(4),
        }
    }
}

/// Rebuilds `target`'s `ReplayContext` from its ancestry and own events.
/// O(N) in the events visible to the target; no per-event database
/// round-trips beyond the range queries themselves.
pub fn replay(store: &Store, session_id: i64, target: Uuid) -> Result<ReplayContext> {
    let ranges = build_replay_ranges(store, session_id, target)?;
    let mut ctx = ReplayContext::new();
    for range in &ranges {
        let events = store.load_range(
            session_id,
            Some(range.agent_uuid),
            range.start_id_exclusive,
            range.end_id_inclusive,
        )?;
        for event in events {
            reduce(&mut ctx, event);
        }
    }
    Ok(ctx)
}
