//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Store path must be set for the file backend")]
    MissingStorePath,

    #[error("Threshold {0} must be within 0.0..=1.0")]
    InvalidThreshold(&'static str),

    #[error("Retry count for {0} exceeds maximum allowed (5)")]
    TooManyRetries(&'static str),

    #[error("Unknown global intent '{0}'")]
    UnknownIntent(String),

    #[error("Skill '{0}' is configured more than once")]
    DuplicateSkill(String),

    #[error("Skill '{0}' has an invalid endpoint URL")]
    InvalidSkillEndpoint(String),

    #[error("Dialog setting {0} must be greater than zero")]
    InvalidDialogLimit(&'static str),
}
