//! Configuration loading functionality.
//!
//! Handles resolving the configuration file path and loading it with
//! validation. Unlike tools that synthesize a default file on first run,
//! matrixd refuses to start without one: the pin assignments describe real
//! wiring and must come from the operator.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::validation::validate_config;
use super::Config;

/// Path of the installed daemon's configuration.
const SYSTEM_CONFIG_PATH: &str = "/etc/matrixd/matrixd.toml";

/// Resolve the configuration file path.
///
/// An explicitly given path wins and is not required to exist yet (the load
/// step reports a readable error if it does not). Otherwise the system path
/// is preferred, falling back to the user's XDG config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let system = PathBuf::from(SYSTEM_CONFIG_PATH);
    if system.exists() {
        return Ok(system);
    }

    if let Some(base) = dirs::config_dir() {
        let user = base.join("matrixd").join("matrixd.toml");
        if user.exists() {
            return Ok(user);
        }
    }

    anyhow::bail!(
        "no configuration file found at {} or $XDG_CONFIG_HOME/matrixd/matrixd.toml \
         (create one or pass --config <file>)",
        SYSTEM_CONFIG_PATH
    )
}

/// Load and validate the configuration, resolving the path automatically.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = resolve_config_path(explicit)?;
    let config = load_from_path(&path)?;
    log_block_start!("Loaded configuration from {}", path.display());
    config.log_config();
    Ok(config)
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;

    validate_config(&config)?;

    Ok(config)
}
