//! Builders for the canonical `Agent`/`Event` shapes tests need to seed a
//! store with, so individual tests don't hand-roll `Uuid::new_v4` and
//! `Utc::now` plumbing every time.

use chrono::Utc;
use forktrace_types::{Agent, EventKind, Result};
use uuid::Uuid;

use forktrace_store::Store;

/// Inserts a fresh root agent into `store` and returns its uuid.
pub fn seed_root(store: &Store) -> Result<Uuid> {
    let uuid = Uuid::new_v4();
    store.insert_agent(&Agent::new_root(uuid, Utc::now()))?;
    Ok(uuid)
}

/// Forks `parent` at `fork_message_id` and inserts the child, returning its
/// uuid. Callers that care about the fork-message linkage should pass the
/// event id their test actually emitted; `0` is fine for tests that don't.
pub fn seed_child(store: &Store, parent: Uuid, fork_message_id: i64) -> Result<Uuid> {
    let uuid = Uuid::new_v4();
    store.insert_agent(&Agent::new_child(uuid, parent, fork_message_id, Utc::now()))?;
    Ok(uuid)
}

/// A small scripted conversation: a `user` message followed by an
/// `assistant` reply, both attributed to `agent`. Returns the two event
/// ids in emission order.
pub fn seed_exchange(
    store: &Store,
    session_id: i64,
    agent: Uuid,
    user_text: &str,
    assistant_text: &str,
) -> Result<(i64, i64)> {
    let user_id = store.insert_event(session_id, Some(agent), &EventKind::User, Some(user_text), None)?;
    let assistant_id = store.insert_event(
        session_id,
        Some(agent),
        &EventKind::Assistant,
        Some(assistant_text),
        None,
    )?;
    Ok((user_id, assistant_id))
}

/// Sends one piece of mail from `from` to `to`, returning its id.
pub fn seed_mail(store: &Store, session_id: i64, from: Uuid, to: Uuid, body: &str) -> Result<i64> {
    store.send_mail(session_id, from, to, body, Utc::now().timestamp())
}
