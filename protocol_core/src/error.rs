//! Error types for the protocol_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for protocol_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template table validation error
    #[error("Template validation error: {0}")]
    TemplateValidation(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Day or cycle counters are 1-based; zero is rejected
    #[error("Invalid training day {0}: days are numbered from 1")]
    InvalidDay(u32),

    /// Lift state cannot supply what a workout needs
    #[error("Invalid lift state: {0}")]
    InvalidLiftState(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
