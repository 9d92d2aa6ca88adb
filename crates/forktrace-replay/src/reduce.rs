use forktrace_types::{Event, EventKind, Mark};

use crate::ReplayContext;

/// Phase 2 of replay: folds one event into the running
/// `(messages, mark_stack)` state. This is the only place the mark-stack
/// pushdown-automaton semantics live — `rewind` pops everything shallower
/// than its target.
pub fn reduce(ctx: &mut ReplayContext, event: Event) {
    match &event.kind {
        EventKind::Clear => {
            ctx.messages.clear();
            ctx.mark_stack.clear();
            // The clear itself is not appended.
        }
        EventKind::Mark => {
            ctx.mark_stack.push(Mark {
                message_id: event.id,
                label: event.data_label(),
            });
            ctx.messages.push(event);
        }
        EventKind::Rewind => reduce_rewind(ctx, event),
        EventKind::Interrupted => reduce_interrupted(ctx),
        // System, User, Assistant, ToolCall, ToolResult, Command,
        // AgentKilled, Fork, and any Unknown kind are appended verbatim.
        _ => ctx.messages.push(event),
    }
}

fn reduce_rewind(ctx: &mut ReplayContext, event: Event) {
    let Some(target) = event.data_target_message_id() else {
        tracing::warn!(event_id = event.id, "rewind event missing target_message_id, skipping");
        return;
    };

    // Topmost (most recently pushed) stack entry matching the target.
    let Some(stack_pos) = ctx.mark_stack.iter().rposition(|m| m.message_id == target) else {
        tracing::warn!(event_id = event.id, target, "rewind to missing mark, skipping");
        return;
    };

    // Truncate messages to everything up to and including the mark event
    // itself, then drop every stack entry above (and including) the target
    // before appending the rewind event.
    if let Some(mark_pos) = ctx.messages.iter().position(|e| e.id == target) {
        ctx.messages.truncate(mark_pos + 1);
    }
    ctx.mark_stack.truncate(stack_pos + 1);
    ctx.messages.push(event);
}

fn reduce_interrupted(ctx: &mut ReplayContext) {
    // Discard the most recent assistant message if any, and if its
    // immediately-preceding message is a user, discard that too. The
    // `interrupted` event itself is not appended.
    if matches!(ctx.messages.last().map(|e| &e.kind), Some(EventKind::Assistant)) {
        ctx.messages.pop();
        if matches!(ctx.messages.last().map(|e| &e.kind), Some(EventKind::User)) {
            ctx.messages.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn event(id: i64, kind: EventKind, content: Option<&str>, data: Option<serde_json::Value>) -> Event {
        Event {
            id,
            session_id: 1,
            agent_uuid: None,
            kind,
            content: content.map(|s| s.to_string()),
            data,
            created_at: Utc::now(),
        }
    }

    fn replay_all(events: Vec<Event>) -> ReplayContext {
        let mut ctx = ReplayContext::default();
        for e in events {
            reduce(&mut ctx, e);
        }
        ctx
    }

    #[test]
    fn clear_semantics_scenario_1() {
        let events = vec![
            event(1, EventKind::Clear, None, None),
            event(2, EventKind::User, Some("A"), None),
            event(3, EventKind::Assistant, Some("X"), None),
            event(4, EventKind::Clear, None, None),
            event(5, EventKind::User, Some("B"), None),
        ];
        let ctx = replay_all(events);
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages[0].content.as_deref(), Some("B"));
    }

    #[test]
    fn mark_rewind_simple_scenario_2() {
        let events = vec![
            event(1, EventKind::User, Some("A"), None),
            event(2, EventKind::Assistant, Some("X"), None),
            event(3, EventKind::Mark, None, Some(json!({"label": "m1"}))),
            event(4, EventKind::User, Some("B"), None),
            event(5, EventKind::Assistant, Some("Y"), None),
            event(6, EventKind::Rewind, None, Some(json!({"target_message_id": 3}))),
        ];
        let ctx = replay_all(events);
        let contents: Vec<_> = ctx
            .messages
            .iter()
            .map(|e| e.content.clone().unwrap_or_else(|| e.kind.to_string()))
            .collect();
        assert_eq!(contents, vec!["A", "X", "mark", "rewind"]);
    }

    #[test]
    fn rewind_discards_deeper_marks_scenario_3() {
        let events = vec![
            event(1, EventKind::User, Some("u1"), None),
            event(2, EventKind::Mark, None, Some(json!({"label": "m1"}))),
            event(3, EventKind::User, Some("u2"), None),
            event(4, EventKind::Mark, None, Some(json!({"label": "m2"}))),
            event(5, EventKind::Rewind, None, Some(json!({"target_message_id": 2}))),
        ];
        let ctx = replay_all(events);
        assert_eq!(ctx.mark_stack.len(), 1);
        assert_eq!(ctx.mark_stack[0].message_id, 2);

        // A subsequent rewind to the now-popped mark (id 4) is skipped.
        let mut ctx2 = ctx;
        reduce(
            &mut ctx2,
            event(6, EventKind::Rewind, None, Some(json!({"target_message_id": 4}))),
        );
        assert_eq!(ctx2.mark_stack.len(), 1);
        assert!(!ctx2.messages.iter().any(|e| e.id == 6));
    }

    #[test]
    fn interrupted_turn_filtering_scenario_6() {
        let events = vec![
            event(1, EventKind::User, Some("Q1"), None),
            event(2, EventKind::Assistant, Some("A1"), None),
            event(3, EventKind::User, Some("Q2"), None),
            event(4, EventKind::Assistant, Some("partial"), None),
            event(5, EventKind::Interrupted, None, None),
            event(6, EventKind::User, Some("Q3"), None),
            event(7, EventKind::Assistant, Some("A3"), None),
        ];
        let ctx = replay_all(events);
        let contents: Vec<_> = ctx.messages.iter().map(|e| e.content.clone().unwrap()).collect();
        assert_eq!(contents, vec!["Q1", "A1", "Q3", "A3"]);
    }

    #[test]
    fn rewind_to_missing_mark_is_a_no_op() {
        let events = vec![
            event(1, EventKind::User, Some("A"), None),
            event(2, EventKind::Rewind, None, Some(json!({"target_message_id": 999}))),
        ];
        let ctx = replay_all(events);
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages[0].content.as_deref(), Some("A"));
    }

    #[test]
    fn trailing_user_with_no_interrupted_marker_is_kept() {
        // Absent an explicit `interrupted`, a dangling trailing user is left
        // in place for the caller to decide on.
        let events = vec![
            event(1, EventKind::User, Some("Q1"), None),
            event(2, EventKind::Assistant, Some("A1"), None),
            event(3, EventKind::User, Some("Q2"), None),
        ];
        let ctx = replay_all(events);
        assert_eq!(ctx.messages.len(), 3);
    }
}
