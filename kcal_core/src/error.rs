//! Error types for the kcal_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kcal_core operations
///
/// The calculation modules never return these; missing profile data
/// degrades to sentinel values instead. Errors come from the edges:
/// config files, imported records and user-supplied dates.
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

    /// A date string that is not a valid `YYYY-MM-DD` calendar date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A week/month/year that cannot be turned into a date range
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Imported record file could not be interpreted
    #[error("Import error: {0}")]
    Import(String),

    /// Session state machine used out of order
    #[error("Session error: {0}")]
    Session(String),
}
