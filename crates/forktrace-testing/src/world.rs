//! Subprocess-level test harness around the compiled `forktrace` binary,
//! modeled on the fluent `TestWorld` pattern: build an isolated environment,
//! feed it a scripted session, assert on what came back.

use std::path::{Path, PathBuf};

use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated `forktrace` environment: one temp directory, one SQLite
/// file, nothing shared with any other test.
pub struct TestWorld {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("session.sqlite3");
        Self { temp_dir, db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Runs the `forktrace` binary against this world's persistent
    /// store, feeding `script` (one command/line per newline) to stdin.
    #[allow(deprecated)]
    pub fn run(&self, script: &str) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("forktrace")
            .map_err(|e| anyhow::anyhow!("failed to find forktrace binary: {e}"))?;
        cmd.arg("--data-dir").arg(&self.db_path);
        cmd.write_stdin(script);
        let output = cmd.output()?;
        Ok(CliResult::from_output(output))
    }

    /// Like [`TestWorld::run`] but against a fresh in-memory store,
    /// discarded when the process exits.
    #[allow(deprecated)]
    pub fn run_ephemeral(&self, script: &str) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("forktrace")
            .map_err(|e| anyhow::anyhow!("failed to find forktrace binary: {e}"))?;
        cmd.arg("--ephemeral");
        cmd.write_stdin(script);
        let output = cmd.output()?;
        Ok(CliResult::from_output(output))
    }

    /// Runs `forktrace dump` against this world's store.
    #[allow(deprecated)]
    pub fn dump(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("forktrace")
            .map_err(|e| anyhow::anyhow!("failed to find forktrace binary: {e}"))?;
        cmd.arg("--data-dir").arg(&self.db_path).arg("dump").args(args);
        let output = cmd.output()?;
        Ok(CliResult::from_output(output))
    }
}

/// The captured result of one `forktrace` invocation.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    fn from_output(output: std::process::Output) -> Self {
        Self {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}
