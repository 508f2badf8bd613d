//! CLI command implementations for `slackify`.
//!
//! - [`convert`] -- Convert a single Markdown document.
//! - [`run`] -- Run the node over a batch of JSON items.
//! - [`describe`] -- Print the node description.
//! - [`config_cmd`] -- Show the resolved configuration.

pub mod config_cmd;
pub mod convert;
pub mod describe;
pub mod run;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use slackify_types::Config;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SLACKIFY_CONFIG";

/// Locate the config file.
///
/// 1. `SLACKIFY_CONFIG` env var
/// 2. `~/.slackify/config.json`, if it exists
pub fn discover_config_path() -> Option<PathBuf> {
    if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    let path = dirs::home_dir()?.join(".slackify").join("config.json");
    path.exists().then_some(path)
}

/// Configuration together with the file it was read from.
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when no file was found and defaults are in use.
    pub source: Option<PathBuf>,
}

/// Load configuration from the given path override or via auto-discovery.
///
/// An explicit `--config` path must exist. A discovered path that does not
/// exist falls back to the default configuration.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<LoadedConfig> {
    let path = match config_override {
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.exists() {
                anyhow::bail!("config file not found: {path_str}");
            }
            path
        }
        None => match discover_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                return Ok(LoadedConfig {
                    config: Config::default(),
                    source: None,
                });
            }
        },
    };
    Ok(LoadedConfig {
        config: read_config(&path)?,
        source: Some(path),
    })
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    Config::from_json_str(&contents)
        .with_context(|| format!("failed to load config: {}", path.display()))
}

/// Read the whole input from `path`, or from stdin when `path` is absent or `-`.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
