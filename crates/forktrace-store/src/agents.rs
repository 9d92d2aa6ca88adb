use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::MapRusqlite;
use crate::store::Store;
use forktrace_types::{Agent, AgentStatus, Error, Result};

/// Outcome of `find_by_prefix`.
pub enum PrefixLookup {
    Exact(Agent),
    Ambiguous,
    NotFound,
}

fn parse_string_list(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn row_to_agent(row: &Row) -> rusqlite::Result<Agent> {
    let uuid: String = row.get("uuid")?;
    let parent_uuid: Option<String> = row.get("parent_uuid")?;
    let created_at: String = row.get("created_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let pinned_paths: String = row.get("pinned_paths")?;
    let toolset_filter: String = row.get("toolset_filter")?;
    Ok(Agent {
        uuid: Uuid::parse_str(&uuid).unwrap_or_default(),
        name: row.get("name")?,
        parent_uuid: parent_uuid.and_then(|s| Uuid::parse_str(&s).ok()),
        fork_message_id: row.get("fork_message_id")?,
        status: AgentStatus::parse(&row.get::<_, String>("status")?).unwrap_or(AgentStatus::Dead),
        created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        ended_at: ended_at.and_then(|s| s.parse::<DateTime<Utc>>().ok()),
        provider: row.get("provider")?,
        model: row.get("model")?,
        thinking_level: row.get("thinking_level")?,
        pinned_paths: parse_string_list(&pinned_paths),
        toolset_filter: parse_string_list(&toolset_filter),
    })
}

impl Store {
    pub fn insert_agent(&self, agent: &Agent) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO agents (
                    uuid, name, parent_uuid, fork_message_id, status, created_at,
                    ended_at, provider, model, thinking_level, pinned_paths, toolset_filter
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    agent.uuid.to_string(),
                    agent.name,
                    agent.parent_uuid.map(|u| u.to_string()),
                    agent.fork_message_id,
                    agent.status.as_str(),
                    agent.created_at.to_rfc3339(),
                    agent.ended_at.map(|t| t.to_rfc3339()),
                    agent.provider,
                    agent.model,
                    agent.thinking_level,
                    serde_json::to_string(&agent.pinned_paths).unwrap(),
                    serde_json::to_string(&agent.toolset_filter).unwrap(),
                ],
            )
            .map_store_err()?;
        Ok(())
    }

    /// Removes an agent row outright. Only used to roll back a failed
    /// `/fork` — agents are otherwise never deleted, only marked dead.
    pub fn delete_agent(&self, uuid: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM agents WHERE uuid = ?1", params![uuid.to_string()])
            .map_store_err()?;
        Ok(())
    }

    pub fn get_agent(&self, uuid: Uuid) -> Result<Agent> {
        self.conn
            .query_row(
                "SELECT * FROM agents WHERE uuid = ?1",
                params![uuid.to_string()],
                row_to_agent,
            )
            .optional()
            .map_store_err()?
            .ok_or_else(|| Error::referential_integrity(format!("unknown agent {uuid}")))
    }

    /// Idempotent: calling `mark_dead` on an already-dead agent is a no-op
    /// for `ended_at`.
    pub fn mark_dead(&self, uuid: Uuid) -> Result<()> {
        self.conn
            .execute(
                "UPDATE agents SET status = 'dead', ended_at = COALESCE(ended_at, ?2)
                 WHERE uuid = ?1",
                params![uuid.to_string(), Utc::now().to_rfc3339()],
            )
            .map_store_err()?;
        Ok(())
    }

    /// The oldest agent with no parent, if one has ever been inserted.
    /// Used by the SDK's engine bootstrap to adopt an existing lineage's
    /// root rather than minting a second one.
    pub fn find_root(&self) -> Result<Option<Agent>> {
        self.conn
            .query_row(
                "SELECT * FROM agents WHERE parent_uuid IS NULL ORDER BY created_at ASC LIMIT 1",
                [],
                row_to_agent,
            )
            .optional()
            .map_store_err()
    }

    pub fn children_of(&self, uuid: Uuid) -> Result<Vec<Agent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM agents WHERE parent_uuid = ?1 ORDER BY created_at ASC")
            .map_store_err()?;
        let rows = stmt
            .query_map(params![uuid.to_string()], row_to_agent)
            .map_store_err()?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_store_err()?);
        }
        Ok(out)
    }

    /// Depth-first post-order walk of `uuid`'s subtree (children before
    /// parent), siblings tie-broken by ascending `created_at`.
    /// Used by cascade kill so the deepest agents are marked dead first.
    pub fn descendants_of(&self, uuid: Uuid) -> Result<Vec<Agent>> {
        let mut out = Vec::new();
        for child in self.children_of(uuid)? {
            let child_uuid = child.uuid;
            out.extend(self.descendants_of(child_uuid)?);
            out.push(child);
        }
        Ok(out)
    }

    /// Prefix match restricted to `running` agents; `Ambiguous` when two or
    /// more running agents share the prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<PrefixLookup> {
        let pattern = format!("{prefix}%");
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM agents WHERE status = 'running' AND uuid LIKE ?1 LIMIT 2")
            .map_store_err()?;
        let rows = stmt.query_map(params![pattern], row_to_agent).map_store_err()?;
        let mut matches = Vec::new();
        for row in rows {
            matches.push(row.map_store_err()?);
        }
        match matches.len() {
            0 => Ok(PrefixLookup::NotFound),
            1 => Ok(PrefixLookup::Exact(matches.remove(0))),
            _ => Ok(PrefixLookup::Ambiguous),
        }
    }

    /// Persists an updated pinned-paths/toolset-filter/model set for an
    /// existing agent.
    pub fn update_agent_config(&self, agent: &Agent) -> Result<()> {
        self.conn
            .execute(
                "UPDATE agents SET
                    provider = ?2, model = ?3, thinking_level = ?4,
                    pinned_paths = ?5, toolset_filter = ?6
                 WHERE uuid = ?1",
                params![
                    agent.uuid.to_string(),
                    agent.provider,
                    agent.model,
                    agent.thinking_level,
                    serde_json::to_string(&agent.pinned_paths).unwrap(),
                    serde_json::to_string(&agent.toolset_filter).unwrap(),
                ],
            )
            .map_store_err()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(store: &Store) -> Agent {
        let a = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&a).unwrap();
        a
    }

    #[test]
    fn descendants_of_is_post_order() {
        let store = Store::open_in_memory().unwrap();
        let parent = root(&store);
        let child1 = Agent::new_child(Uuid::new_v4(), parent.uuid, 1, Utc::now());
        store.insert_agent(&child1).unwrap();
        let grandchild = Agent::new_child(Uuid::new_v4(), child1.uuid, 1, Utc::now());
        store.insert_agent(&grandchild).unwrap();
        let child2 = Agent::new_child(Uuid::new_v4(), parent.uuid, 1, Utc::now());
        store.insert_agent(&child2).unwrap();

        let descendants = store.descendants_of(parent.uuid).unwrap();
        let uuids: Vec<Uuid> = descendants.iter().map(|a| a.uuid).collect();
        let gc_pos = uuids.iter().position(|u| *u == grandchild.uuid).unwrap();
        let c1_pos = uuids.iter().position(|u| *u == child1.uuid).unwrap();
        assert!(gc_pos < c1_pos);
        assert_eq!(descendants.len(), 3);
    }

    #[test]
    fn find_by_prefix_detects_ambiguity() {
        let store = Store::open_in_memory().unwrap();
        let a = root(&store);
        match store.find_by_prefix(&a.uuid.to_string()[..8]).unwrap() {
            PrefixLookup::Exact(found) => assert_eq!(found.uuid, a.uuid),
            _ => panic!("expected exact match"),
        }
        match store.find_by_prefix("ffffffff").unwrap() {
            PrefixLookup::NotFound => {}
            _ => panic!("expected not found"),
        }
    }

    #[test]
    fn mark_dead_is_idempotent_on_ended_at() {
        let store = Store::open_in_memory().unwrap();
        let a = root(&store);
        store.mark_dead(a.uuid).unwrap();
        let first = store.get_agent(a.uuid).unwrap();
        store.mark_dead(a.uuid).unwrap();
        let second = store.get_agent(a.uuid).unwrap();
        assert_eq!(first.ended_at, second.ended_at);
    }
}
