use chrono::Utc;
use forktrace_replay::replay;
use forktrace_store::Store;
use forktrace_types::{Agent, EventKind};
use uuid::Uuid;

/// Replay of a grandchild includes the full parent chain in chronological
/// order, ancestor events first.
#[test]
fn fork_chronology_across_three_generations() {
    let store = Store::open_in_memory().unwrap();
    let session_id = store.create_session().unwrap();

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
    let e4 = store
        .insert_event(session_id, Some(child.uuid), &EventKind::Assistant, Some("e4"), None)
        .unwrap();

    let grandchild = Agent::new_child(Uuid::new_v4(), child.uuid, e4, Utc::now());
    store.insert_agent(&grandchild).unwrap();
    store
        .insert_event(session_id, Some(grandchild.uuid), &EventKind::User, Some("e5"), None)
        .unwrap();

    let ctx = replay(&store, session_id, grandchild.uuid).unwrap();
    let contents: Vec<_> = ctx.messages.iter().map(|e| e.content.clone().unwrap()).collect();
    assert_eq!(contents, vec!["e1", "e2", "e3", "e4", "e5"]);

    let child_ctx = replay(&store, session_id, child.uuid).unwrap();
    let child_contents: Vec<_> = child_ctx.messages.iter().map(|e| e.content.clone().unwrap()).collect();
    assert_eq!(child_contents, vec!["e1", "e2", "e3", "e4"]);
}

#[test]
fn replaying_root_agent_with_clear_mid_stream() {
    let store = Store::open_in_memory().unwrap();
    let session_id = store.create_session().unwrap();
    let root = Agent::new_root(Uuid::new_v4(), Utc::now());
    store.insert_agent(&root).unwrap();

    store
        .insert_event(session_id, Some(root.uuid), &EventKind::Clear, None, None)
        .unwrap();
    store
        .insert_event(session_id, Some(root.uuid), &EventKind::User, Some("A"), None)
        .unwrap();
    store
        .insert_event(session_id, Some(root.uuid), &EventKind::Assistant, Some("X"), None)
        .unwrap();
    store
        .insert_event(session_id, Some(root.uuid), &EventKind::Clear, None, None)
        .unwrap();
    store
        .insert_event(session_id, Some(root.uuid), &EventKind::User, Some("B"), None)
        .unwrap();

    let ctx = replay(&store, session_id, root.uuid).unwrap();
    assert_eq!(ctx.messages.len(), 1);
    assert_eq!(ctx.messages[0].content.as_deref(), Some("B"));
}
