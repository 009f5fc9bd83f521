//! Layered application configuration.
//!
//! Values come from built-in defaults, then an optional `config.toml` under the
//! user's config directory, then `ARCADE_*` environment variables.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under `~/.config` holding configuration and local storage.
pub const APP_DIR: &str = "cherry-arcade";

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_CONFIG_TOML: &str = r#"# Cherry Arcade configuration.
# Every key is optional; environment variables prefixed with ARCADE_ win over this file.

# Directory holding the persisted leaderboard.
# storage_root = "/home/me/.config/cherry-arcade/storage"

# Generative-language endpoint and model used by the Cyber-Santa chat.
api_base = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash"

# API key. Leave unset to read GEMINI_API_KEY (or API_KEY) from the environment.
# api_key = ""

# Where log files are written. Defaults to ./logs
# log_dir = "/tmp/cherry-arcade-logs"
"#;

/// Resolved runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory of the local key-value store.
    pub storage_root: PathBuf,
    /// Base URL of the generative-language REST API.
    pub api_base: String,
    /// Model identifier used for chat replies.
    pub model: String,
    /// API key for the generative-language service.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Directory for log files.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: app_dir().join("storage"),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Write the default config file if it is missing, then load it.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(config_path())
    }

    /// Same as [`AppConfig::load_or_create`] but for an explicit path.
    pub fn load_or_create_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure_default_config_at(path)?;
        Self::load_from(path)
    }

    /// Load configuration, reading the TOML file at `path` if it exists.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default(
                "storage_root",
                defaults.storage_root.to_string_lossy().to_string(),
            )?
            .set_default("api_base", defaults.api_base)?
            .set_default("model", defaults.model)?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("ARCADE"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        config.api_key = config
            .api_key
            .take()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .or_else(api_key_from_env);
        Ok(config)
    }

    /// Directory where log files should be written.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(env::current_dir()?.join("logs")),
        }
    }
}

/// Write a commented default `config.toml` unless one already exists.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Same as [`ensure_default_config`] but for an explicit path.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

/// `~/.config/cherry-arcade`, or `./cherry-arcade` when no config dir exists.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

fn api_key_from_env() -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert!(config.api_base.starts_with("https://"));
        assert!(config.storage_root.ends_with("storage"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let storage = dir.path().join("kv");
        fs::write(
            &path,
            format!(
                "api_base = \"http://localhost:9999\"\nstorage_root = \"{}\"\n",
                storage.display().to_string().replace('\\', "/")
            ),
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base, "http://localhost:9999");
        assert_eq!(
            config.storage_root.to_string_lossy().replace('\\', "/"),
            storage.display().to_string().replace('\\', "/")
        );
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        fs::write(&path, "model = \"custom\"\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "model = \"custom\"\n");
        Ok(())
    }

    #[test]
    fn first_run_writes_then_reads_default_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fresh").join("config.toml");

        let config = AppConfig::load_or_create_at(&path)?;
        assert!(path.exists());
        assert_eq!(config.api_base, DEFAULT_API_BASE);

        fs::write(&path, "api_base = \"http://127.0.0.1:8080\"\n")?;
        let config = AppConfig::load_or_create_at(&path)?;
        assert_eq!(config.api_base, "http://127.0.0.1:8080");
        Ok(())
    }

    #[test]
    fn default_config_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        ensure_default_config_at(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert!(!config.model.is_empty());
        Ok(())
    }
}
