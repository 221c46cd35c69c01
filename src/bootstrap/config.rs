//! # Configuration Loader
//!
//! Reads the TOML file into [`AppConfig`]. Section and field defaults live on
//! the config types themselves; this module only finds the file and parses it.

use anyhow::Context;
use std::path::{Path, PathBuf};

use ap_core::AppConfig;

const APP_DIR_NAME: &str = "autopress";
const CONFIG_FILE_NAME: &str = "config.toml";

/// `<platform config dir>/autopress/config.toml`
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().context("Platform config directory is unavailable")?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML for
/// [`AppConfig`].
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Resolve and load the configuration for this invocation.
///
/// An explicit path must exist. The default path is optional: when nothing is
/// there the built-in defaults apply.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let path = default_config_path()?;
    if path.exists() {
        load_config(&path)
    } else {
        Ok(AppConfig::default())
    }
}
