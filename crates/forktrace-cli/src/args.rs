use clap::{Parser, Subcommand};

/// The demonstration driver for the forktrace conversation engine. The
/// line-editing input buffer, slash-command parser, and provider HTTP
/// clients are all external collaborators in a real deployment; this
/// binary stands in for them with a plain stdin loop and an echo
/// provider so the engine's behavior can be exercised end to end.
#[derive(Parser)]
#[command(name = "forktrace")]
#[command(about = "Event-sourced multi-agent conversation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Where the SQLite-backed event log lives. Ignored with `--ephemeral`.
    #[arg(long, default_value = "~/.forktrace/session.sqlite3", global = true)]
    pub data_dir: String,

    /// Run against a throwaway in-memory store instead of `--data-dir`.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump raw event rows for a session, bypassing the REPL.
    Dump {
        /// Session id to dump. Defaults to the active session.
        #[arg(long)]
        session: Option<i64>,
        /// Restrict to one agent's own stream (by UUID or prefix).
        #[arg(long)]
        agent: Option<String>,
    },
}
