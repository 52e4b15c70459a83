use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "Codetree";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CODETREE_CONFIG";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "codetree", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the platform configuration file.
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_directory().map(|dir| dir.join(CONFIG_FILE))
}

/// Picks the config file: explicit path, then `$CODETREE_CONFIG`, then the
/// platform location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => get_config_file_path(),
    }
}

/// Loads the application configuration.
///
/// A missing file yields the defaults; at the platform location the defaults
/// are also written out. A file that cannot be parsed logs a warning and
/// falls back to the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_config_path(explicit)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if !config_path.exists() {
        let default_config = AppConfig::default();
        if Some(&config_path) == get_config_file_path().as_ref() {
            tracing::info!(
                "Config file not found, creating default config at {:?}",
                config_path
            );
            save_config(&default_config, Some(&config_path))?;
        } else {
            tracing::info!("Config file {:?} not found, using defaults", config_path);
        }
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(AppConfig::default())
        }
    }
}

/// Saves the configuration to `path`, or to the platform location.
pub fn save_config(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => get_config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }
    }

    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

/// Exports the current configuration to a user-specified JSON file.
pub fn export_config(config: &AppConfig, export_path: &Path) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(export_path, config_json)?;
    tracing::info!("Exported config to {:?}", export_path);
    Ok(())
}

/// Imports a configuration from a user-specified JSON file.
///
/// Unlike [`load_config`], a malformed file is an error here.
pub fn import_config(import_path: &Path) -> Result<AppConfig> {
    let config_content = fs::read_to_string(import_path)
        .with_context(|| format!("Failed to read {}", import_path.display()))?;
    let config = serde_json::from_str::<AppConfig>(&config_content)
        .with_context(|| format!("Invalid config file {}", import_path.display()))?;
    tracing::info!("Imported config from {:?}", import_path);
    Ok(config)
}
