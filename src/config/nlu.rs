//! NLU classifier configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct NluConfig {
    /// Locale used when the inbound activity carries none
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Dispatch label that routes to the general model
    #[serde(default = "default_general_label")]
    pub general_label: String,
}

impl NluConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 5 {
            return Err(ValidationError::TooManyRetries("nlu"));
        }
        if self.general_label.trim().is_empty() {
            return Err(ValidationError::MissingRequired("NLU__GENERAL_LABEL"));
        }
        Ok(())
    }
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_retries(),
            general_label: default_general_label(),
        }
    }
}

fn default_locale() -> String {
    "en-us".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_retries() -> u32 {
    1
}

fn default_general_label() -> String {
    "l_general".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_include_first_call() {
        let config = NluConfig::default();
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_retry_cap() {
        let config = NluConfig {
            max_retries: 9,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::TooManyRetries("nlu")));
    }
}
