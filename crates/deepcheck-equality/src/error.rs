//! Error types for value inspection

use std::fmt::Display;

use thiserror::Error;

/// Result type for inspection through serde
pub type InspectResult<T> = Result<T, InspectError>;

/// Errors that can occur while inspecting a value through serde
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InspectError {
    /// The value's `Serialize` impl reported an error
    #[error("failed to inspect value: {message}")]
    Custom { message: String },

    /// A map value was serialized before its key
    #[error("map value serialized without a key")]
    MissingMapKey,
}

impl serde::ser::Error for InspectError {
    fn custom<T: Display>(msg: T) -> Self {
        InspectError::Custom {
            message: msg.to_string(),
        }
    }
}
