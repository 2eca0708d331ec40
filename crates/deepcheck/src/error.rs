//! Error types for assertion settings

use thiserror::Error;

/// Result type for loading settings
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading settings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}
