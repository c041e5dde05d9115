//! Core error types for ptaw-core.
//!
//! This module defines the error hierarchy using thiserror. Every fallible
//! operation in the library returns one of these; nothing panics on bad
//! input or a damaged preset document.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ptaw-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preset store errors
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preset store errors.
#[derive(Error, Debug)]
pub enum PresetError {
    /// The document exists but is not a preset mapping.
    #[error("Preset store at {path} is corrupt: {message}")]
    StoreCorrupt { path: PathBuf, message: String },

    /// No preset with this name.
    #[error("Preset '{0}' not found")]
    NotFound(String),

    /// Phase count differs from the sequencer's.
    #[error("Preset has {actual} phases, sequencer expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A bound or value inside the preset is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Writing the document failed.
    #[error("Failed to write preset store to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors while reading or preparing the store location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors, raised where user or file input is parsed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Lower bound above upper bound, or a bound outside its domain
    #[error("Invalid range for '{field}': min ({min}) must be <= max ({max}) and both within the allowed bounds")]
    InvalidRange {
        field: String,
        min: String,
        max: String,
    },

    /// Unparseable color string
    #[error("Invalid color '{0}': expected rgba(r, g, b, a), rgb(r, g, b) or #rrggbb[aa]")]
    InvalidColor(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn range(field: impl Into<String>, min: impl ToString, max: impl ToString) -> Self {
        ValidationError::InvalidRange {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}
