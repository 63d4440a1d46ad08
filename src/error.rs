//! Error types. None of these are fatal to the frame loop: callers log them
//! and fall back to defaults or skip the affected feature.

use thiserror::Error;

/// Failures while loading or validating a tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read tuning file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// RON parsing failed.
    #[error("parse error in '{path}': {details}")]
    Parse { path: String, details: String },

    /// The values parsed but make no sense together.
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Failures while resolving a sprite or sound.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    Missing(String),
}
