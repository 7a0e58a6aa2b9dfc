//! Startup configuration.
//!
//! Read from an optional JSON file; missing fields take the defaults from
//! [`prelude`](crate::prelude).

use std::{fs, io, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prelude::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("grid_size must be at least 1")]
    ZeroGridSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    /// cells per side
    pub grid_size: usize,
    pub tick_interval_ms: u64,
    pub random_life: bool,
    /// pattern selected at startup, by catalog name
    pub pattern: Option<String>,
    /// keep state in this JSON file instead of memory
    pub state_file: Option<PathBuf>,
    /// continue from the state file rather than starting fresh
    pub resume: bool,
    /// seed for the random-life source
    pub seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            random_life: false,
            pattern: None,
            state_file: None,
            resume: false,
            seed: None,
        }
    }
}

impl LifeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        Ok(())
    }
}
