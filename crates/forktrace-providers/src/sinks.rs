/// Everything the Conversation Core writes for the user to see goes through
/// this sink. The line editor/renderer that actually paints it is out of
/// scope here.
pub trait ScrollbackSink: Send + Sync {
    fn append_line(&self, text: &str);
}

/// Optional sink for non-fatal warnings: store write failures,
/// rewind-to-missing-mark, missing-fork anomalies.
pub trait DebugLogSink: Send + Sync {
    fn write(&self, line: &str);
}

/// A `DebugLogSink` that drops everything, for callers that don't care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugLogSink;

impl DebugLogSink for NoopDebugLogSink {
    fn write(&self, _line: &str) {}
}
