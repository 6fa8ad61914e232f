//! Application configuration module
//!
//! This module provides type-safe configuration loading from an optional
//! config file and environment variables using the `config` and `dotenvy`
//! crates. Environment variables use the `DIALOG_ENGINE` prefix and nested
//! values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use dialog_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod dialogs;
mod error;
mod interruption;
mod nlu;
mod server;
mod skills;
mod store;

pub use dialogs::DialogsConfig;
pub use error::{ConfigError, ValidationError};
pub use interruption::InterruptionConfig;
pub use nlu::NluConfig;
pub use server::{LogFormat, ServerConfig};
pub use skills::{SkillConfig, SkillsConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;
use std::path::Path;

/// Base name of the optional config file (`dialog-engine.toml`, `.yaml`, `.json`)
pub const CONFIG_FILE: &str = "dialog-engine";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Session store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Classifier locale, timeouts and labels
    #[serde(default)]
    pub nlu: NluConfig,

    /// Interruption thresholds and shortcuts
    #[serde(default)]
    pub interruption: InterruptionConfig,

    /// External skills
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Root dialog, step budget and concrete dialog tunables
    #[serde(default)]
    pub dialogs: DialogsConfig,
}

impl AppConfig {
    /// Load configuration from the optional config file and the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `dialog-engine.{toml,yaml,json}` from the working directory if present
    /// 3. Reads environment variables with `DIALOG_ENGINE` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DIALOG_ENGINE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DIALOG_ENGINE__STORE__BACKEND=file` -> `store.backend = file`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::build(config::File::with_name(CONFIG_FILE).required(false))
    }

    /// Like [`AppConfig::load`] but reads the given file instead.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DIALOG_ENGINE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.store.validate()?;
        self.nlu.validate()?;
        self.interruption.validate()?;
        self.skills.validate()?;
        self.dialogs.validate()?;
        Ok(())
    }
}
