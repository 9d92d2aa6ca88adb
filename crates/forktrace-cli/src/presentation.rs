use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use forktrace_providers::{DebugLogSink, ScrollbackSink};

/// Writes scrollback lines to stdout, colorizing the `Error:`/`Warning:`
/// prefixes when stdout is a terminal. Plain text otherwise, so piping
/// stays diff-friendly.
pub struct ConsoleScrollback {
    color: bool,
}

impl Default for ConsoleScrollback {
    fn default() -> Self {
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }
}

impl ScrollbackSink for ConsoleScrollback {
    fn append_line(&self, text: &str) {
        if !self.color {
            println!("{text}");
            return;
        }
        if let Some(rest) = text.strip_prefix("Error:") {
            println!("{}{}", "Error:".red().bold(), rest);
        } else if let Some(rest) = text.strip_prefix("Warning:") {
            println!("{}{}", "Warning:".yellow().bold(), rest);
        } else {
            println!("{text}");
        }
    }
}

/// Forwards non-fatal engine warnings (store write failures,
/// rewind-to-missing-mark, ...) to `tracing`.
#[derive(Default)]
pub struct TracingDebugLog;

impl DebugLogSink for TracingDebugLog {
    fn write(&self, line: &str) {
        tracing::warn!(target: "forktrace", "{line}");
    }
}
