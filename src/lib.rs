//! URL Shield — classifies URLs as benign, malware, phishing or defacement.
//!
//! Modular structure:
//! - [`features`] — URL splitting and 64-field lexical/structural feature extraction
//! - [`model`] — Robust scaler, label mapping, ONNX classifier
//! - [`heuristics`] — Trusted-domain bypass and low-confidence phishing guardrails
//! - [`pipeline`] — Immutable inference pipeline and start-up service state
//! - [`server`] — HTTP request boundary
//! - [`cli`] — Command-line scanner and artifact tools
//! - [`logging`] — Structured JSON logging

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod heuristics;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod server;

pub use config::ServiceConfig;
pub use error::{ArtifactError, InferenceError};
pub use features::{extract, FeatureExtractor, FeatureVector};
pub use heuristics::{HeuristicPolicy, OverrideRule};
pub use logging::StructuredLogger;
pub use model::{Classifier, LabelMap, OnnxClassifier, RobustScaler, UrlClass};
pub use pipeline::{InferencePipeline, PredictionResult, ServiceState};
