//! An in-process `Engine` fixture for tests that want to drive the
//! conversation core directly — no subprocess, no stdin loop — while still
//! being able to assert on everything the scrollback sink would have shown
//! a user.

use std::sync::Arc;

use forktrace_providers::stub::{RecordingScrollbackSink, TracingDebugLogSink};
use forktrace_providers::ScrollbackSink;
use forktrace_runtime::Config;
use forktrace_sdk::Engine;
use forktrace_types::Result;

/// Forwards to a shared [`RecordingScrollbackSink`] so the engine's `Box<dyn
/// ScrollbackSink>` and the test's handle to the recorded lines can coexist.
struct SharedScrollback(Arc<RecordingScrollbackSink>);

impl ScrollbackSink for SharedScrollback {
    fn append_line(&self, text: &str) {
        self.0.append_line(text);
    }
}

/// Opens an ephemeral, in-memory `Engine` plus a handle to every line it
/// writes to scrollback, for assertions like
/// `assert!(lines.lock().unwrap().iter().any(|l| l.contains("Forked")))`.
pub fn in_memory_engine() -> Result<(Engine, Arc<RecordingScrollbackSink>)> {
    let scrollback = Arc::new(RecordingScrollbackSink::default());
    let engine = Engine::open_in_memory(
        Config::default(),
        Box::new(SharedScrollback(scrollback.clone())),
        Box::new(TracingDebugLogSink),
    )?;
    Ok((engine, scrollback))
}
