//! Core error types for thinkfirst-core.
//!
//! Nothing in the engine is fatal: classification failures fall back to the
//! heuristic, corrupted state falls back to defaults. These types exist so
//! the degraded paths can say precisely what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for thinkfirst-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Classification errors
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Malformed calendar bucket keys
    #[error("Bucket key error: {0}")]
    BucketKey(#[from] BucketKeyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Persistence-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the state document
    #[error("Failed to read state from {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Failed to write the state document
    #[error("Failed to write state to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// The stored blob is not valid JSON
    #[error("Stored state is not valid JSON: {0}")]
    Corrupted(String),

    /// The in-memory state could not be encoded
    #[error("Failed to encode state: {0}")]
    Encode(String),
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
}

/// Remote-classification errors. All of these are transient and recoverable:
/// the caller falls back to the local heuristic.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// No API key available
    #[error("Classifier API key not configured")]
    MissingApiKey,

    /// Transport-level failure
    #[error("Request to classification service failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("Classification service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body parsed, but not into the expected shape
    #[error("Malformed classification response: {0}")]
    MalformedResponse(String),
}

/// Raised when a persisted bucket key fails to parse.
///
/// Always recoverable: callers substitute the current date rather than
/// propagate, so a corrupted blob cannot take the engine down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bucket key '{key}': {reason}")]
pub struct BucketKeyError {
    pub key: String,
    pub reason: String,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
