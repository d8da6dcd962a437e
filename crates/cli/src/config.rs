use gradinsight_selection::Thresholds;
use gradinsight_shaper::ShapingOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_BASE_ENV: &str = "GRADINSIGHT_API_BASE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No analytics service configured: pass --api-base, set GRADINSIGHT_API_BASE, or add api_base to the config file")]
    MissingApiBase,

    #[error("Invalid api_base '{0}': expected an http:// or https:// URL")]
    InvalidApiBase(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub thresholds: Thresholds,
    pub shaping: ShapingOptions,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub thresholds: Thresholds,
    pub shaping: ShapingOptions,
}

impl AppConfig {
    /// Resolve settings: `flag` beats `env`, which beats the config file.
    ///
    /// A missing base URL is fatal; there is no built-in default.
    pub fn resolve(
        flag: Option<&str>,
        env: Option<String>,
        file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let file_config = match file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let api_base = flag
            .map(str::to_string)
            .or(env)
            .or(file_config.api_base)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiBase)?;

        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBase(api_base));
        }

        Ok(Self {
            api_base,
            thresholds: file_config.thresholds,
            shaping: file_config.shaping,
        })
    }
}
