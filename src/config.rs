//! User configuration
//!
//! Read from `config.ron` in the platform config directory. A missing file
//! means defaults; a broken one is logged and replaced by defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::RenderMode;

/// Environment variable that overrides `api_key`
pub const API_KEY_ENV: &str = "DRINKMENU_API_KEY";

const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint returning the menu records
    pub menu_url: String,
    /// Bearer token sent with the menu request
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Forces a render mode instead of detecting one
    pub render_mode: Option<RenderMode>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu_url: "http://127.0.0.1:8000/menu.json".to_string(),
            api_key: None,
            timeout_secs: 10,
            render_mode: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_with(&config_path(), env::var(API_KEY_ENV).ok())
    }

    /// Load `path` if it exists, then apply the environment key override
    fn load_with(path: &Path, env_api_key: Option<String>) -> Self {
        let mut config = if path.exists() {
            Self::load_from(path).unwrap_or_else(|e| {
                log::warn!("{}. Using default configuration.", e);
                Self::default()
            })
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Some(key) = env_api_key {
            config.apply_api_key(key);
        }
        config
    }

    /// Load a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// An empty key clears the configured one
    fn apply_api_key(&mut self, key: String) {
        let key = key.trim();
        self.api_key = if key.is_empty() { None } else { Some(key.to_string()) };
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "drinkmenu", "Drinkmenu") {
        proj_dirs.config_dir().join(CONFIG_FILE)
    } else {
        PathBuf::from(".").join(CONFIG_FILE)
    }
}
