use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::error::MapRusqlite;
use crate::store::Store;
use forktrace_types::Result;

impl Store {
    /// Creates a fresh active session.
    pub fn create_session(&self) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO sessions (started_at, ended_at) VALUES (?1, NULL)",
                params![Utc::now().to_rfc3339()],
            )
            .map_store_err()?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent session with `ended_at IS NULL`, or 0 if none. The caller
    /// creates a fresh session when this returns 0.
    pub fn get_active_session(&self) -> Result<i64> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM sessions WHERE ended_at IS NULL ORDER BY id DESC LIMIT 1",
                [],
                |r| r.get(0),
            )
            .optional()
            .map_store_err()?;
        Ok(id.unwrap_or(0))
    }

    /// Ends a session explicitly.
    pub fn end_session(&self, session_id: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE sessions SET ended_at = ?2 WHERE id = ?1",
                params![session_id, Utc::now().to_rfc3339()],
            )
            .map_store_err()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_active_session_is_zero_when_none_exists() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.get_active_session().unwrap(), 0);
    }

    #[test]
    fn create_then_adopt_most_recent_active() {
        let store = Store::open_in_memory().unwrap();
        let first = store.create_session().unwrap();
        assert_eq!(store.get_active_session().unwrap(), first);
        let second = store.create_session().unwrap();
        assert_eq!(store.get_active_session().unwrap(), second);
    }

    #[test]
    fn ended_session_is_no_longer_active() {
        let store = Store::open_in_memory().unwrap();
        let session_id = store.create_session().unwrap();
        store.end_session(session_id).unwrap();
        assert_eq!(store.get_active_session().unwrap(), 0);
    }
}
