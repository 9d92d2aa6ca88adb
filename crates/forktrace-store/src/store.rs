use std::path::Path;

use rusqlite::Connection;

use crate::error::MapRusqlite;
use crate::schema;
use forktrace_types::Result;

/// A single-connection handle onto the event log, agent registry, mailbox,
/// and session tables. Writes are serialized through the REPL's cooperative
/// loop, so `Store` does no internal locking beyond what `rusqlite` already
/// provides.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_store_err()?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;
        Ok(store)
    }

    /// An in-memory store, used by tests and by the demonstration CLI's
    /// `--ephemeral` mode.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_store_err()?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_and_initializes_schema() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn opening_a_file_path_twice_preserves_prior_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("events.sqlite3");

        let session_id = {
            let store = Store::open(&db_path).unwrap();
            store.create_session().unwrap()
        };

        let store = Store::open(&db_path).unwrap();
        assert_eq!(store.get_active_session().unwrap(), session_id);
    }
}
