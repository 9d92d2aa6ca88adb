//! End-to-end tests that drive the compiled `forktrace` binary over stdin,
//! the way a real terminal session would.

use forktrace_testing::assertions::assert_any_line_contains;
use forktrace_testing::TestWorld;

#[test]
fn plain_text_gets_an_echoed_reply() {
    let world = TestWorld::new();
    let result = world.run_ephemeral("hello there\n/exit\n").unwrap();
    assert!(result.success(), "stderr: {}", result.stderr);
    let lines = result.lines();
    assert_any_line_contains(&lines, "echo: hello there").unwrap();
}

#[test]
fn help_lists_every_slash_command() {
    let world = TestWorld::new();
    let result = world.run_ephemeral("/help\n/exit\n").unwrap();
    assert!(result.success());
    let lines = result.lines();
    assert_any_line_contains(&lines, "/clear").unwrap();
    assert_any_line_contains(&lines, "/fork").unwrap();
    assert_any_line_contains(&lines, "/toolset").unwrap();
}

#[test]
fn fork_then_agents_shows_two_agents() {
    let world = TestWorld::new();
    let result = world.run_ephemeral("/fork\n/agents\n/exit\n").unwrap();
    assert!(result.success(), "stderr: {}", result.stderr);
    let lines = result.lines();
    assert_any_line_contains(&lines, "Forked to").unwrap();
    let agent_lines: Vec<&&str> = lines.iter().filter(|l| l.contains('[')).collect();
    assert_eq!(agent_lines.len(), 2, "expected root + forked child: {lines:?}");
}

#[test]
fn unknown_command_reports_an_error_without_crashing() {
    let world = TestWorld::new();
    let result = world.run_ephemeral("/bogus\n/exit\n").unwrap();
    assert!(result.success());
    assert_any_line_contains(&result.lines(), "unknown command").unwrap();
}

#[test]
fn mark_and_rewind_round_trip() {
    let world = TestWorld::new();
    let result = world
        .run_ephemeral("hello\n/mark checkpoint\nignored\n/rewind checkpoint\n/exit\n")
        .unwrap();
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_any_line_contains(&result.lines(), "Rewound.").unwrap();
}

#[test]
fn persistent_store_survives_across_invocations() {
    let world = TestWorld::new();
    let first = world.run("/fork --model claude-sonnet-4-5\n/exit\n").unwrap();
    assert!(first.success(), "stderr: {}", first.stderr);

    let second = world.run("/agents\n/exit\n").unwrap();
    assert!(second.success(), "stderr: {}", second.stderr);
    let lines = second.lines();
    let agent_lines: Vec<&&str> = lines.iter().filter(|l| l.contains('[')).collect();
    assert_eq!(agent_lines.len(), 2, "expected the forked child to persist: {lines:?}");
}

#[test]
fn dump_prints_raw_events_for_a_persistent_session() {
    let world = TestWorld::new();
    let run = world.run("hi\n/exit\n").unwrap();
    assert!(run.success(), "stderr: {}", run.stderr);

    let dumped = world.dump(&[]).unwrap();
    assert!(dumped.success(), "stderr: {}", dumped.stderr);
    assert_any_line_contains(&dumped.lines(), "user").unwrap();
}
