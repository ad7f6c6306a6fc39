use crate::client::ClientSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub client: ClientSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to open config file at {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("Unable to parse config file at {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

impl Config {
    pub async fn load(path: &Path) -> Result<Config, ConfigError> {
        let settings_str = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

        toml::from_str(&settings_str).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }
}
