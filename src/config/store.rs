use std::fs;
use std::path::{Path, PathBuf};

use super::{ConfigError, StrategyConfig};

const APP_DIR: &str = "gsignin";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_CLIENT_ID: &str = "GSIGNIN_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GSIGNIN_CLIENT_SECRET";

/// Locates and loads the strategy config. Holds no secrets itself.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Uses `<config dir>/gsignin/config.toml`.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(APP_DIR);

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE),
        })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the file as-is. A missing file yields an empty config.
    pub fn load_file(&self) -> Result<StrategyConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(StrategyConfig::default());
        }

        let contents = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })
    }

    /// File, then environment overrides, then defaults against
    /// `strategy_url`, then validation.
    pub fn load(&self, strategy_url: &str) -> Result<StrategyConfig, ConfigError> {
        self.load_with_env(strategy_url, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(&self, strategy_url: &str, env: F) -> Result<StrategyConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;

        if let Some(client_id) = env(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            config.client_id = client_id;
        }
        if let Some(client_secret) = env(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            config.client_secret = client_secret;
        }

        config.apply_defaults(strategy_url);
        config.validate()?;

        if config.context_options.accepts_invalid_certs() {
            tracing::warn!(
                path = %self.config_path.display(),
                "context_options.danger_accept_invalid_certs is set; TLS certificates will not be verified"
            );
        }

        Ok(config)
    }
}
