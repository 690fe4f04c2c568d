//! Error taxonomy: configuration, artifact loading, classifier runs, per-request inference.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Raised while loading or validating a persisted artifact (scaler, label map, model).
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact: {0}")]
    Invalid(String),
    #[error("model load failed: {0}")]
    Model(String),
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier session error: {0}")]
    Session(String),
    #[error("expected {expected} class probabilities, got {actual}")]
    OutputShape { expected: usize, actual: usize },
    #[error("classifier produced a non-finite probability")]
    NonFinite,
    #[error("expected {expected} input features, got {actual}")]
    InputShape { expected: usize, actual: usize },
}

/// Per-request failure. Terminal for that request only; never retried.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Artifacts failed to load at start-up; no computation is attempted.
    #[error("Model not loaded")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ClassifierError> for InferenceError {
    fn from(e: ClassifierError) -> Self {
        InferenceError::Internal(e.to_string())
    }
}

impl From<ArtifactError> for InferenceError {
    fn from(e: ArtifactError) -> Self {
        InferenceError::Internal(e.to_string())
    }
}
