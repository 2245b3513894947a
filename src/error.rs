//! Error types for project conversion.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while ingesting or converting a project.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested asset is not present in the active asset store.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Input is shaped wrong for the dialect (or entity) being decoded.
    #[error("Malformed {dialect} data: {message}")]
    MalformedDialect {
        dialect: &'static str,
        message: String,
    },

    /// No ingestion branch accepted the input.
    #[error("Invalid project")]
    InvalidProject { reasons: Vec<String> },

    /// A coordinate field was present but not numeric.
    #[error("Cannot convert {field} value {value} to a number")]
    UnitConversion { field: &'static str, value: String },

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Archive(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(String),

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Network error other than a missing asset.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// Feature compiled out or collaborator unavailable.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Create an archive error.
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    /// Create a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Malformed Scratch 2 (older, positional) data.
    pub fn sb2(message: impl Into<String>) -> Self {
        Self::MalformedDialect {
            dialect: "Scratch 2",
            message: message.into(),
        }
    }

    /// Malformed Scratch 3 (newer, keyed) data.
    pub fn sb3(message: impl Into<String>) -> Self {
        Self::MalformedDialect {
            dialect: "Scratch 3",
            message: message.into(),
        }
    }

    /// Malformed legacy binary data.
    pub fn legacy(message: impl Into<String>) -> Self {
        Self::MalformedDialect {
            dialect: "Scratch 1.x",
            message: message.into(),
        }
    }
}
