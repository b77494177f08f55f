//! Cache configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries (0 = unbounded).
    #[serde(default)]
    pub max_entries: usize,

    /// Delay in milliseconds between a store and the collection sweep it
    /// schedules.
    #[serde(default = "default_collect_interval")]
    pub collect_interval_ms: u64,
}

fn default_collect_interval() -> u64 {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 0,
            collect_interval_ms: default_collect_interval(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a TOML string.
    pub fn load_str(content: &str) -> Result<Self, CacheError> {
        Ok(toml::from_str(content)?)
    }

    /// The collection delay as a [`Duration`].
    pub fn collect_interval(&self) -> Duration {
        Duration::from_millis(self.collect_interval_ms)
    }
}
