//! Public facade over the conversation engine: wires the
//! [`forktrace_store::Store`], the replay engine, and
//! [`forktrace_runtime::ConversationCore`] into one `Engine`, running the
//! session-adoption startup sequence (`get_active`; if 0, `create`; then
//! the Replay Engine reconstructs each agent's context on first entry).
//!
//! This is the thin wiring layer a REPL, a test harness, or any other
//! embedder sits on top of — it owns no presentation logic of its own.

use std::path::Path;

use chrono::Utc;
use forktrace_providers::{DebugLogSink, ScrollbackSink};
use forktrace_runtime::{Config, ConversationCore};
use forktrace_store::Store;
use forktrace_types::{Agent, Result};
use uuid::Uuid;

/// A running engine instance: one session, one open store, one live
/// [`ConversationCore`]. The root agent is created on first open and
/// adopted (not recreated) on every subsequent open against the same
/// store.
pub struct Engine {
    core: ConversationCore,
    root_uuid: Uuid,
}

impl Engine {
    /// Opens (or initializes) an engine against a SQLite file at `db_path`.
    /// Runs the session-adoption sequence and the root-agent bootstrap
    /// before the first command can be dispatched.
    pub fn open(
        db_path: &Path,
        config: Config,
        scrollback: Box<dyn ScrollbackSink>,
        debug_log: Box<dyn DebugLogSink>,
    ) -> Result<Self> {
        let store = Store::open(db_path)?;
        Self::from_store(store, config, scrollback, debug_log)
    }

    /// In-memory variant, used by tests and `--ephemeral` runs.
    pub fn open_in_memory(
        config: Config,
        scrollback: Box<dyn ScrollbackSink>,
        debug_log: Box<dyn DebugLogSink>,
    ) -> Result<Self> {
        let store = Store::open_in_memory()?;
        Self::from_store(store, config, scrollback, debug_log)
    }

    fn from_store(
        store: Store,
        config: Config,
        scrollback: Box<dyn ScrollbackSink>,
        debug_log: Box<dyn DebugLogSink>,
    ) -> Result<Self> {
        let session_id = match store.get_active_session()? {
            0 => store.create_session()?,
            id => id,
        };
        let root_uuid = Self::ensure_root(&store, session_id)?;
        let core = ConversationCore::new(store, config, session_id, root_uuid, scrollback, debug_log)?;
        Ok(Self { core, root_uuid })
    }

    /// Adopts the session's existing root agent (the oldest agent with no
    /// parent) or creates one.
    fn ensure_root(store: &Store, session_id: i64) -> Result<Uuid> {
        let _ = session_id; // root lookup is session-agnostic: one store, one root lineage
        if let Some(existing) = store.find_root()? {
            return Ok(existing.uuid);
        }
        let root = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&root)?;
        Ok(root.uuid)
    }

    pub fn root_uuid(&self) -> Uuid {
        self.root_uuid
    }

    pub fn session_id(&self) -> i64 {
        self.core.session_id()
    }

    /// All agents in the engine's lineage, for presenting the `/agents`
    /// tree. Returns the root plus every descendant, in the
    /// same post-order the registry computes for cascade kill.
    pub fn all_agents(&self) -> Result<Vec<Agent>> {
        let mut agents = vec![self.core.store().get_agent(self.root_uuid)?];
        agents.extend(self.core.store().descendants_of(self.root_uuid)?);
        Ok(agents)
    }

    pub fn conversation(&self) -> &ConversationCore {
        &self.core
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationCore {
        &mut self.core
    }

    pub fn store(&self) -> &Store {
        self.core.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forktrace_providers::stub::{RecordingScrollbackSink, TracingDebugLogSink};

    #[test]
    fn opening_twice_against_the_same_store_adopts_the_same_root() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("forktrace.sqlite3");

        let root_a = {
            let engine = Engine::open(
                &db_path,
                Config::default(),
                Box::new(RecordingScrollbackSink::default()),
                Box::new(TracingDebugLogSink),
            )
            .unwrap();
            engine.root_uuid()
        };

        let root_b = Engine::open(
            &db_path,
            Config::default(),
            Box::new(RecordingScrollbackSink::default()),
            Box::new(TracingDebugLogSink),
        )
        .unwrap()
        .root_uuid();

        assert_eq!(root_a, root_b);
    }

    #[test]
    fn fresh_engine_has_one_running_root_agent() {
        let engine = Engine::open_in_memory(
            Config::default(),
            Box::new(RecordingScrollbackSink::default()),
            Box::new(TracingDebugLogSink),
        )
        .unwrap();
        assert_eq!(engine.conversation().current_agent(), engine.root_uuid());
    }
}
