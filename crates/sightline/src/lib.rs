//! sightline library - Build-quality dashboard over analysis reports
//!
//! This library exposes the configuration, report store, HTTP API and
//! terminal rendering used by the `sightline` binary, for testing and
//! embedding purposes.

pub mod config;
pub mod output;
pub mod server;
pub mod store;

use config::{CONFIG_PATH, Config};
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Nearest ancestor of the current directory holding a sightline config,
/// or the current directory if there is none.
pub fn find_project_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;

    loop {
        if current.join(CONFIG_PATH).exists() {
            return Ok(current);
        }

        if !current.pop() {
            // No config found, use current directory
            return std::env::current_dir().wrap_err("Failed to get current directory");
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file pointing at your reports:\n\n\
             report_dir = \"reports\"\n\
             source_dir = \".\"",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return the default config.
/// Unreadable or malformed files are logged and ignored.
pub fn load_config_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{:#}, using defaults", e);
            Config::default()
        }
    }
}
