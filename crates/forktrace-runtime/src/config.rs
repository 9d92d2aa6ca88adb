use std::path::{Path, PathBuf};

use forktrace_types::Result;
use serde::{Deserialize, Serialize};

/// Engine-wide configuration: provider defaults plus the knobs the
/// Conversation Core consults directly (`max_tool_turns`, `max_output_size`,
/// `history_size`). Loaded from TOML with `~` expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_model: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    /// Turn limit before the Conversation Core forces `tool_choice: none`.
    pub max_tool_turns: u32,
    /// Bound on a single tool result's captured output, in bytes.
    pub max_output_size: usize,
    /// Number of past messages eagerly kept warm outside of full replay.
    pub history_size: usize,
    pub system_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: "claude-sonnet-4-5".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 4096,
            max_tool_turns: 25,
            max_output_size: 1 << 20,
            history_size: 200,
            system_prompt: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = expand_tilde(path);
        let text = std::fs::read_to_string(&expanded)
            .map_err(|e| forktrace_types::Error::io(format!("reading {}: {e}", expanded.display())))?;
        toml::from_str(&text).map_err(|e| forktrace_types::Error::parse(e.to_string()))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert!(cfg.max_tool_turns > 0);
        assert!(cfg.default_max_tokens > 0);
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forktrace.toml");
        std::fs::write(&path, "max_tool_turns = 5\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.max_tool_turns, 5);
        assert_eq!(cfg.default_model, Config::default().default_model);
    }
}
