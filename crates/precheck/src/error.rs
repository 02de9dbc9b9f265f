//! Error types for the precheck runtime
//!
//! Validation failures are not errors: they are entries in a
//! `ValidationResult`. This type covers what can go wrong around a
//! validation: loading files, preparing declarations, and registry misses.

use precheck_core::DeclarationErrors;
use std::io;
use std::path::PathBuf;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A declaration failed its checks and cannot be prepared
    #[error("Invalid declaration: {0}")]
    Declaration(#[from] DeclarationErrors),

    /// File extension not recognized by a loader
    #[error("Unsupported file format for {}: expected .toml, .yaml, .yml or .json", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// No validator registered for the requested model
    #[error("No validator registered for model '{model}'")]
    NotRegistered { model: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_registered(model: impl Into<String>) -> Self {
        Self::NotRegistered {
            model: model.into(),
        }
    }
}
