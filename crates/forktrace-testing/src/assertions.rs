//! Readable assertions for the shapes tests check most often, so failures
//! read as "expected an echo line" instead of a bare `assert!` with no
//! context.

use anyhow::{Context, Result};

/// Asserts that some line in `lines` contains `needle`, for loose matching
/// against REPL output that includes a leading `> ` prompt.
pub fn assert_any_line_contains(lines: &[&str], needle: &str) -> Result<()> {
    if lines.iter().any(|l| l.contains(needle)) {
        Ok(())
    } else {
        anyhow::bail!("expected some line to contain {needle:?}, got: {lines:?}")
    }
}

/// Asserts that no line in `lines` contains `needle`.
pub fn assert_no_line_contains(lines: &[&str], needle: &str) -> Result<()> {
    if lines.iter().any(|l| l.contains(needle)) {
        anyhow::bail!("expected no line to contain {needle:?}, got: {lines:?}")
    } else {
        Ok(())
    }
}

/// Parses a `/agents` dump line's leading uuid, stripping the `*`/` `
/// current-agent marker.
pub fn parse_agent_uuid(line: &str) -> Result<uuid::Uuid> {
    let trimmed = line.trim_start_matches(['*', ' ']);
    let token = trimmed
        .split_whitespace()
        .next()
        .context("expected an agent line with a leading uuid")?;
    uuid::Uuid::parse_str(token).context("agent line did not start with a valid uuid")
}
