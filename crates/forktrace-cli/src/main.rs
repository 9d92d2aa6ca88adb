mod args;
mod dispatch;
mod humanize;
mod presentation;
mod repl;

use std::path::{Path, PathBuf};

use clap::Parser;
use forktrace_runtime::Config;
use forktrace_sdk::Engine;

use args::{Cli, Commands};
use presentation::{ConsoleScrollback, TracingDebugLog};

fn main() {
    // Reset SIGPIPE to default behavior so piping into `head`/`less` that
    // exits early doesn't panic the process.
    #[cfg(unix)]
    reset_sigpipe();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::default();

    let engine = if cli.ephemeral {
        Engine::open_in_memory(config, Box::new(ConsoleScrollback::default()), Box::new(TracingDebugLog))?
    } else {
        let db_path = expand_tilde(&cli.data_dir);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Engine::open(&db_path, config, Box::new(ConsoleScrollback::default()), Box::new(TracingDebugLog))?
    };

    match cli.command {
        Some(Commands::Dump { session, agent }) => dump(&engine, session, agent)?,
        None => {
            let session = dispatch::Session::new(engine)?;
            repl::run(session);
        }
    }
    Ok(())
}

/// `forktrace dump`: prints raw event rows for a
/// session, bypassing the REPL and the replay engine entirely.
fn dump(engine: &Engine, session: Option<i64>, agent: Option<String>) -> anyhow::Result<()> {
    let session_id = session.unwrap_or_else(|| engine.session_id());
    let agent_uuid = match agent {
        Some(prefix) => Some(match engine.store().find_by_prefix(&prefix)? {
            forktrace_store::agents::PrefixLookup::Exact(a) => a.uuid,
            forktrace_store::agents::PrefixLookup::Ambiguous => {
                anyhow::bail!("ambiguous agent prefix '{prefix}'")
            }
            forktrace_store::agents::PrefixLookup::NotFound => {
                anyhow::bail!("no running agent matches '{prefix}'")
            }
        }),
        None => None,
    };
    let events = engine.store().load_range(session_id, agent_uuid, 0, 0)?;
    for event in events {
        println!(
            "#{:<6} {:<12} agent={:<36} content={:?} data={}",
            event.id,
            event.kind.as_str(),
            event
                .agent_uuid
                .map(|u| u.to_string())
                .unwrap_or_else(|| "-".to_string()),
            event.content,
            event.data.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    Path::new(path).to_path_buf()
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
