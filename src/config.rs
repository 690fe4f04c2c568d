//! Service configuration. Every section has defaults; a missing file means "all defaults".

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Persisted training artifacts
    pub artifacts: ArtifactsConfig,
    /// HTTP request boundary
    pub server: ServerConfig,
    /// Trusted-domain bypass and phishing guardrails
    pub heuristics: HeuristicsConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Process root; the artifact paths below are resolved against it
    pub root: PathBuf,
    /// Trained classifier exported to ONNX
    pub model: PathBuf,
    /// Fitted robust scaler (JSON)
    pub scaler: PathBuf,
    /// Fitted label mapping (JSON)
    pub encoder: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Applies to both the HTTP and the CLI path
    pub enabled: bool,
    /// Substring-matched against the URL's authority
    pub trusted_domains: Vec<String>,
    /// PHISHING below this confidence (percent) on a shallow URL is downgraded
    pub low_suspicion_threshold: f32,
    /// PHISHING below this confidence (percent) is downgraded regardless of shape
    pub low_confidence_threshold: f32,
    /// Max number of '/' in the whole URL for it to count as shallow
    pub shallow_max_slashes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            model: PathBuf::from("models/phishing_model_2026.onnx"),
            scaler: PathBuf::from("pkl_files/scaler.json"),
            encoder: PathBuf::from("pkl_files/encoder.json"),
        }
    }
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.root.join(&self.model)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.root.join(&self.scaler)
    }

    pub fn encoder_path(&self) -> PathBuf {
        self.root.join(&self.encoder)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trusted_domains: [
                "google.com",
                "wikipedia.org",
                "microsoft.com",
                "apple.com",
                "github.com",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            low_suspicion_threshold: 90.0,
            low_confidence_threshold: 70.0,
            shallow_max_slashes: 3,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// Load from JSON file if present; otherwise return default.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
