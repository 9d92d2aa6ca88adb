use forktrace_store::Store;
use forktrace_types::Result;
use uuid::Uuid;

/// A contiguous segment of one agent's event stream contributing to a
/// target agent's replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRange {
    pub agent_uuid: Uuid,
    pub start_id_exclusive: i64,
    pub end_id_inclusive: i64,
}

/// Phase 1 of replay: walk backwards from `target` through its ancestry,
/// collecting one range per agent on the path, until a `clear` is found or
/// the root is reached. Returns ranges in chronological order (eldest
/// ancestor first) — the walk itself runs youngest-to-oldest and is
/// reversed at the end.
pub fn build_replay_ranges(store: &Store, session_id: i64, target: Uuid) -> Result<Vec<ReplayRange>> {
    let mut ranges = Vec::new();
    let mut current = target;
    // 0 means "open ended, to current tail" for the target's own range; for
    // every ancestor range above it, this is instead the child's
    // fork_message_id.
    let mut end_bound = 0i64;

    loop {
        let clear_cutoff = store.last_clear_id(session_id, current)?;
        ranges.push(ReplayRange {
            agent_uuid: current,
            start_id_exclusive: clear_cutoff,
            end_id_inclusive: end_bound,
        });

        // A clear anywhere along the chain terminates the walk: ancestors
        // above it are invisible.
        if clear_cutoff > 0 {
            break;
        }

        let agent = match store.get_agent(current) {
            Ok(agent) => agent,
            Err(_) => {
                tracing::warn!(agent = %current, "replay: agent vanished mid-walk, treating as root boundary");
                break;
            }
        };

        match agent.parent_uuid {
            None => break,
            Some(parent_uuid) => match store.get_agent(parent_uuid) {
                Ok(_) => {
                    end_bound = agent.fork_message_id;
                    current = parent_uuid;
                }
                Err(_) => {
                    tracing::warn!(
                        agent = %current,
                        parent = %parent_uuid,
                        "replay: dangling parent_uuid, treating as root boundary"
                    );
                    break;
                }
            },
        }
    }

    ranges.reverse();
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forktrace_types::{Agent, EventKind};

    fn new_session(store: &Store) -> i64 {
        store.create_session().unwrap()
    }

    #[test]
    fn root_with_no_events_yields_single_empty_range() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let root = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&root).unwrap();

        let ranges = build_replay_ranges(&store, session_id, root.uuid).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start_id_exclusive, 0);
        assert_eq!(ranges[0].end_id_inclusive, 0);
    }

    #[test]
    fn fork_chronology_spans_parent_then_child() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let root = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&root).unwrap();
        store
            .insert_event(session_id, Some(root.uuid), &EventKind::User, Some("e1"), None)
            .unwrap();
        let e2 = store
            .insert_event(session_id, Some(root.uuid), &EventKind::Assistant, Some("e2"), None)
            .unwrap();

        let child = Agent::new_child(Uuid::new_v4(), root.uuid, e2, Utc::now());
        store.insert_agent(&child).unwrap();
        store
            .insert_event(session_id, Some(child.uuid), &EventKind::User, Some("e3"), None)
            .unwrap();

        let ranges = build_replay_ranges(&store, session_id, child.uuid).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].agent_uuid, root.uuid);
        assert_eq!(ranges[0].end_id_inclusive, e2);
        assert_eq!(ranges[1].agent_uuid, child.uuid);
        assert_eq!(ranges[1].end_id_inclusive, 0);
    }

    #[test]
    fn clear_in_target_stops_the_walk_at_the_parent() {
        let store = Store::open_in_memory().unwrap();
        let session_id = new_session(&store);
        let root = Agent::new_root(Uuid::new_v4(), Utc::now());
        store.insert_agent(&root).unwrap();
        let e1 = store
            .insert_event(session_id, Some(root.uuid), &EventKind::User, Some("e1"), None)
            .unwrap();

        let child = Agent::new_child(Uuid::new_v4(), root.uuid, e1, Utc::now());
        store.insert_agent(&child).unwrap();
        store
            .insert_event(session_id, Some(child.uuid), &EventKind::Clear, None, None)
            .unwrap();
        store
            .insert_event(session_id, Some(child.uuid), &EventKind::User, Some("after"), None)
            .unwrap();

        let ranges = build_replay_ranges(&store, session_id, child.uuid).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].agent_uuid, child.uuid);
    }
}
