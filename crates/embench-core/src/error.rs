//! Error types for the embench evaluation core.
//!
//! Errors are split by concern so callers can tell a bad configuration apart
//! from a failure inside an encoder or classifier.

use thiserror::Error;

/// Top-level error type for embench operations.
#[derive(Error, Debug)]
pub enum EmbenchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Evaluation and ranking errors
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while evaluating an encoder or ranking models.
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The evaluation was asked to do something it cannot (no experiments,
    /// mismatched input/label counts, unknown main score, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The encoder failed or returned an unusable batch
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Classifier fit/predict failed
    #[error("Classifier '{classifier}' failed: {message}")]
    Classifier { classifier: String, message: String },

    /// Embeddings of different widths were mixed
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A requested split is not in the dataset subset
    #[error("Split '{split}' not found in subset '{subset}'")]
    MissingSplit { subset: String, split: String },

    /// A requested subset is not in the dataset
    #[error("Subset '{0}' not found in dataset")]
    MissingSubset(String),

    /// Labels do not fit the classification mode
    #[error("Invalid labels at record {index}: {message}")]
    InvalidLabels { index: usize, message: String },

    /// The cancellation token fired
    #[error("Cancelled during {stage}")]
    Cancelled { stage: String },
}

/// Convenience type alias for embench results.
pub type Result<T> = std::result::Result<T, EmbenchError>;

/// Convenience type alias for evaluation-specific results.
pub type EvalResult<T> = std::result::Result<T, EvaluationError>;
