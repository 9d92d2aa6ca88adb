use rusqlite::Connection;

use crate::Result;

/// Bump when a table definition changes in a way old rows can't survive.
/// Unlike a schema-on-read index, this store's rows *are* the source of
/// truth, so a version bump here is a real migration hazard, not a
/// cache-rebuild signal — there is deliberately no `drop_all_tables` escape
/// hatch.
pub const SCHEMA_VERSION: i32 = 1;

/// Applies the schema to a fresh (or already-initialized) connection.
/// Idempotent: safe to call on every `open`.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            ended_at TEXT
        );

        CREATE TABLE IF NOT EXISTS agents (
            uuid TEXT PRIMARY KEY,
            name TEXT,
            parent_uuid TEXT REFERENCES agents(uuid),
            fork_message_id INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'running' CHECK (status IN ('running', 'dead')),
            created_at TEXT NOT NULL,
            ended_at TEXT,
            provider TEXT,
            model TEXT,
            thinking_level TEXT,
            pinned_paths TEXT NOT NULL DEFAULT '[]',
            toolset_filter TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_agents_parent ON agents(parent_uuid);

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            agent_uuid TEXT REFERENCES agents(uuid),
            kind TEXT NOT NULL,
            content TEXT,
            data TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%f000Z', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_agent ON messages(session_id, agent_uuid, id);

        CREATE TABLE IF NOT EXISTS mail (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            from_uuid TEXT NOT NULL REFERENCES agents(uuid),
            to_uuid TEXT NOT NULL REFERENCES agents(uuid),
            body TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            read INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_mail_inbox ON mail(to_uuid, read, timestamp DESC);
        "#,
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
