///
/// # Configuration
///
/// Runtime knobs for thread spawning and select polling, read from a TOML
/// document. Every field has a default, so an empty document (or no file at
/// all) gives the plain behavior of `spawn` and `Select::new`.
///
/// ## Example
///
/// ```toml
/// [thread]
/// name_prefix = "worker"
/// stack_size = 262144
///
/// [select]
/// poll = "spin"
/// spin_limit = 128
/// ```
///

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThreadsConfig {
    pub thread: ThreadConfig,
    pub select: SelectConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Spawned threads are named `<name_prefix>-<id>`
    pub name_prefix: String,
    pub stack_size: Option<usize>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            name_prefix: "concord".to_string(),
            stack_size: None,
        }
    }
}

/// What a select loop does after a pass that found nothing to serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStrategy {
    #[default]
    Yield,
    Spin,
    Sleep,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub poll: PollStrategy,
    /// Idle passes spent spinning before falling back to a yield
    pub spin_limit: u32,
    pub sleep_micros: u64,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            poll: PollStrategy::Yield,
            spin_limit: 64,
            sleep_micros: 50,
        }
    }
}

impl ThreadsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded threads config");
        Ok(config)
    }
}
