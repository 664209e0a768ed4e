//! Error types for the plank_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for plank_core operations
///
/// Transition requests that make no sense for the current phase are not
/// errors; the state machine ignores them. Corrupt preferences and feedback
/// failures are recovered where they happen and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A caller passed a value outside the documented domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout plan validation error
    #[error("Plan validation error: {0}")]
    Plan(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
