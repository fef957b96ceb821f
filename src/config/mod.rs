mod store;
mod types;

use std::path::PathBuf;

pub use store::{ConfigStore, ENV_CLIENT_ID, ENV_CLIENT_SECRET};
pub use types::StrategyConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required config key '{0}'")]
    MissingKey(&'static str),

    #[error("Invalid URL for '{key}': {source}")]
    InvalidUrl {
        key: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
