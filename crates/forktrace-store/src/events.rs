use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::MapRusqlite;
use crate::store::Store;
use forktrace_types::{Event, EventKind, Result};

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let agent_uuid: Option<String> = row.get("agent_uuid")?;
    let data: Option<String> = row.get("data")?;
    let created_at: String = row.get("created_at")?;
    Ok(Event {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        agent_uuid: agent_uuid.and_then(|s| Uuid::parse_str(&s).ok()),
        kind: EventKind::parse(&row.get::<_, String>("kind")?),
        content: row.get("content")?,
        data: data.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl Store {
    /// Appends an event. Atomic: `id` and `created_at` are assigned by the
    /// single `INSERT`. `data` is serialized to the `TEXT` column standing
    /// in for a `jsonb` column.
    pub fn insert_event(
        &self,
        session_id: i64,
        agent_uuid: Option<Uuid>,
        kind: &EventKind,
        content: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> Result<i64> {
        let data_text = data.map(|v| v.to_string());
        self.conn
            .execute(
                "INSERT INTO messages (session_id, agent_uuid, kind, content, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session_id,
                    agent_uuid.map(|u| u.to_string()),
                    kind.as_str(),
                    content,
                    data_text
                ],
            )
            .map_store_err()?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Ascending-`id` range read. `start_id_exclusive == 0` means "from the
    /// beginning"; `end_id_inclusive == 0` means "open ended, to the
    /// current tail".
    pub fn load_range(
        &self,
        session_id: i64,
        agent_uuid: Option<Uuid>,
        start_id_exclusive: i64,
        end_id_inclusive: i64,
    ) -> Result<Vec<Event>> {
        let agent_filter = agent_uuid.map(|u| u.to_string());
        let end = if end_id_inclusive == 0 {
            i64::MAX
        } else {
            end_id_inclusive
        };
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, session_id, agent_uuid, kind, content, data, created_at
                 FROM messages
                 WHERE session_id = ?1
                   AND (agent_uuid IS ?2)
                   AND id > ?3 AND id <= ?4
                 ORDER BY id ASC",
            )
            .map_store_err()?;
        let rows = stmt
            .query_map(
                params![session_id, agent_filter, start_id_exclusive, end],
                row_to_event,
            )
            .map_store_err()?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_store_err()?);
        }
        Ok(events)
    }

    /// Most recent event id for `(session, agent)`, or 0 if none. Used to
    /// pin a child's `fork_message_id` at fork time.
    pub fn last_id(&self, session_id: i64, agent_uuid: Uuid) -> Result<i64> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(id) FROM messages WHERE session_id = ?1 AND agent_uuid = ?2",
                params![session_id, agent_uuid.to_string()],
                |r| r.get(0),
            )
            .optional()
            .map_store_err()?
            .flatten();
        Ok(id.unwrap_or(0))
    }

    /// Most recent `clear` event id in an agent's own stream, or 0 if none.
    pub fn last_clear_id(&self, session_id: i64, agent_uuid: Uuid) -> Result<i64> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(id) FROM messages
                 WHERE session_id = ?1 AND agent_uuid = ?2 AND kind = 'clear'",
                params![session_id, agent_uuid.to_string()],
                |r| r.get(0),
            )
            .optional()
            .map_store_err()?
            .flatten();
        Ok(id.unwrap_or(0))
    }

    /// Count of events in a session, optionally filtered by kind. Used by
    /// tests and audits.
    pub fn count(&self, session_id: i64, kind: Option<&EventKind>) -> Result<i64> {
        match kind {
            Some(k) => self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM messages WHERE session_id = ?1 AND kind = ?2",
                    params![session_id, k.as_str()],
                    |r| r.get(0),
                )
                .map_store_err(),
            None => self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                    params![session_id],
                    |r| r.get(0),
                )
                .map_store_err(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forktrace_types::Agent;

    fn new_session(store: &Store) -> i64 {
        store.create_session().unwrap()
    }

    fn new_agent(store: &Store) -> Uuid {
        let agent = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&agent).unwrap();
        agent.uuid
    }

    #[test]
    fn insert_assigns_monotonic_ids() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let a = store
            .insert_event(session_id, None, &EventKind::System, Some("hi"), None)
            .unwrap();
        let b = store
            .insert_event(session_id, None, &EventKind::User, Some("hello"), None)
            .unwrap();
        assert!(b > a);
    }

    #[test]
    fn load_range_is_ascending_and_bounded() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let agent = new_agent(&store);
        store
            .insert_event(session_id, Some(agent), &EventKind::User, Some("A"), None)
            .unwrap();
        let mark_id = store
            .insert_event(session_id, Some(agent), &EventKind::Mark, None, None)
            .unwrap();
        store
            .insert_event(session_id, Some(agent), &EventKind::User, Some("B"), None)
            .unwrap();

        let all = store.load_range(session_id, Some(agent), 0, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content.as_deref(), Some("A"));

        let bounded = store
            .load_range(session_id, Some(agent), 0, mark_id)
            .unwrap();
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn unknown_session_is_referential_integrity_error() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .insert_event(999, None, &EventKind::System, None, None)
            .unwrap_err();
        assert_eq!(err.kind(), "referential_integrity");
    }

    #[test]
    fn last_clear_id_tracks_most_recent_clear() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let agent = new_agent(&store);
        assert_eq!(store.last_clear_id(session_id, agent).unwrap(), 0);
        store
            .insert_event(session_id, Some(agent), &EventKind::User, Some("x"), None)
            .unwrap();
        let clear_id = store
            .insert_event(session_id, Some(agent), &EventKind::Clear, None, None)
            .unwrap();
        assert_eq!(store.last_clear_id(session_id, agent).unwrap(), clear_id);
    }
}
