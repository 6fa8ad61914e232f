//! Session store configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Which session store backend to run with
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Lost on restart; development and tests
    #[default]
    Memory,
    /// YAML files under `path`
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base directory for the file backend
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StoreBackend::File && self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingStorePath);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/state")
}
