//! Inference pipeline: extract → scale → classify → label → (heuristics) → result.
//!
//! Artifacts are loaded once through [`InferencePipeline::load`] and never mutated
//! afterwards, so a pipeline can be shared across requests behind an `Arc` with no locking.
//! [`ServiceState`] records whether loading succeeded; when it did not, every request
//! fails fast with [`InferenceError::Unavailable`].

use crate::config::{ArtifactsConfig, ServiceConfig};
use crate::error::{ArtifactError, InferenceError};
use crate::features::FeatureExtractor;
use crate::heuristics::{HeuristicPolicy, OverrideRule};
use crate::model::{
    ClassProbabilities, Classifier, LabelMap, OnnxClassifier, RobustScaler, UrlClass,
    CLASS_COUNT,
};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub const STATUS_SUCCESS: &str = "Success";

/// Where the loaded artifacts came from and what exactly was loaded
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub model_path: String,
    pub model_sha256: String,
    pub scaler_path: String,
    pub scaler_sha256: String,
    pub encoder_path: String,
    pub encoder_sha256: String,
    pub loaded_at: DateTime<Utc>,
}

/// Per-class confidence in output-index order, serialized as `{"BENIGN": "97.12%", ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct Confidences(Vec<(UrlClass, f32)>);

impl Confidences {
    pub fn iter(&self) -> impl Iterator<Item = &(UrlClass, f32)> {
        self.0.iter()
    }

    /// Confidence for `class` in percent
    pub fn get(&self, class: UrlClass) -> Option<f32> {
        self.0.iter().find(|(c, _)| *c == class).map(|(_, p)| *p)
    }

    pub fn formatted(&self) -> Vec<(UrlClass, String)> {
        self.0
            .iter()
            .map(|(c, p)| (*c, format_percent(*p)))
            .collect()
    }
}

impl Serialize for Confidences {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (class, pct) in &self.0 {
            map.serialize_entry(class.as_str(), &format_percent(*pct))?;
        }
        map.end()
    }
}

pub fn format_percent(pct: f32) -> String {
    format!("{:.2}%", pct)
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub url: String,
    pub final_prediction: UrlClass,
    /// Classifier's argmax before any guardrail (BENIGN for trusted domains)
    pub raw_prediction: UrlClass,
    /// Model output index; absent when the classifier was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_index: Option<usize>,
    /// Winning probability in percent
    pub confidence: f32,
    pub confidences: Confidences,
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_rule: Option<OverrideRule>,
    pub status: &'static str,
}

impl PredictionResult {
    fn trusted(url: &str, labels: &LabelMap) -> Self {
        let confidences = labels
            .classes()
            .iter()
            .map(|c| (*c, if *c == UrlClass::Benign { 100.0 } else { 0.0 }))
            .collect();
        Self {
            url: url.to_string(),
            final_prediction: UrlClass::Benign,
            raw_prediction: UrlClass::Benign,
            raw_index: None,
            confidence: 100.0,
            confidences: Confidences(confidences),
            override_rule: Some(OverrideRule::TrustedDomain),
            status: STATUS_SUCCESS,
        }
    }
}

fn file_sha256(path: &Path) -> Result<String, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

pub struct InferencePipeline {
    extractor: FeatureExtractor,
    scaler: RobustScaler,
    classifier: Box<dyn Classifier>,
    labels: LabelMap,
    heuristics: Option<HeuristicPolicy>,
    info: Option<ArtifactInfo>,
}

impl InferencePipeline {
    /// Assemble a pipeline from already-loaded parts.
    pub fn new(
        scaler: RobustScaler,
        classifier: Box<dyn Classifier>,
        labels: LabelMap,
    ) -> Result<Self, ArtifactError> {
        scaler.validate()?;
        Ok(Self {
            extractor: FeatureExtractor::new(),
            scaler,
            classifier,
            labels,
            heuristics: None,
            info: None,
        })
    }

    /// Load scaler, label map and ONNX model from paths under `artifacts.root`.
    pub fn load(artifacts: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let model_path = artifacts.model_path();
        let scaler_path = artifacts.scaler_path();
        let encoder_path = artifacts.encoder_path();

        let scaler = RobustScaler::load(&scaler_path)?;
        let labels = LabelMap::load(&encoder_path)?;
        let classifier = OnnxClassifier::load(&model_path)?;

        let info = ArtifactInfo {
            model_sha256: file_sha256(&model_path)?,
            scaler_sha256: file_sha256(&scaler_path)?,
            encoder_sha256: file_sha256(&encoder_path)?,
            model_path: model_path.display().to_string(),
            scaler_path: scaler_path.display().to_string(),
            encoder_path: encoder_path.display().to_string(),
            loaded_at: Utc::now(),
        };
        info!(
            model = %info.model_path,
            model_sha256 = %info.model_sha256,
            scaler_sha256 = %info.scaler_sha256,
            encoder_sha256 = %info.encoder_sha256,
            "artifacts loaded"
        );

        let mut pipeline = Self::new(scaler, Box::new(classifier), labels)?;
        pipeline.info = Some(info);
        Ok(pipeline)
    }

    /// Attach (or detach, with `None`) the heuristic override layer
    pub fn with_heuristics(mut self, policy: Option<HeuristicPolicy>) -> Self {
        self.heuristics = policy;
        self
    }

    pub fn info(&self) -> Option<&ArtifactInfo> {
        self.info.as_ref()
    }

    /// Classify one URL.
    pub fn infer(&self, url: &str) -> Result<PredictionResult, InferenceError> {
        if let Some(policy) = &self.heuristics {
            if let Some(domain) = policy.trusted_match(url) {
                info!(url, domain, "trusted domain; classifier skipped");
                return Ok(PredictionResult::trusted(url, &self.labels));
            }
        }

        let features = self.extractor.extract(url);
        let scaled = self.scaler.transform(&features)?;
        let probs = self.classifier.predict_proba(&scaled)?;
        let result = self.decide(url, &probs)?;

        info!(
            url,
            prediction = %result.final_prediction,
            confidence = result.confidence,
            override_rule = ?result.override_rule,
            "prediction"
        );
        Ok(result)
    }

    fn decide(&self, url: &str, probs: &ClassProbabilities) -> Result<PredictionResult, InferenceError> {
        let raw_index = probs.argmax();
        let raw = self.labels.class_of(raw_index).ok_or_else(|| {
            InferenceError::Internal(format!("class index {raw_index} outside label map"))
        })?;
        let confidence = probs.max() * 100.0;

        let override_rule = self
            .heuristics
            .as_ref()
            .and_then(|p| p.review(url, raw, confidence));
        let final_prediction = if override_rule.is_some() {
            UrlClass::Benign
        } else {
            raw
        };

        let pcts: [f32; CLASS_COUNT] = probs.percentages();
        let confidences = self
            .labels
            .classes()
            .iter()
            .copied()
            .zip(pcts)
            .collect();

        Ok(PredictionResult {
            url: url.to_string(),
            final_prediction,
            raw_prediction: raw,
            raw_index: Some(raw_index),
            confidence,
            confidences: Confidences(confidences),
            override_rule,
            status: STATUS_SUCCESS,
        })
    }
}

/// Start-up outcome shared by every request.
#[derive(Clone)]
pub enum ServiceState {
    Ready(Arc<InferencePipeline>),
    Unavailable { reason: String },
}

impl ServiceState {
    pub fn from_load(result: Result<InferencePipeline, ArtifactError>) -> Self {
        match result {
            Ok(p) => ServiceState::Ready(Arc::new(p)),
            Err(e) => {
                error!(error = %e, "artifact load failed; inference disabled");
                ServiceState::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Load artifacts and attach the configured heuristics. Never fails; see [`Self::infer`].
    pub fn load(config: &ServiceConfig) -> Self {
        let policy = HeuristicPolicy::from_config(&config.heuristics);
        Self::from_load(InferencePipeline::load(&config.artifacts).map(|p| p.with_heuristics(policy)))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServiceState::Ready(_))
    }

    pub fn pipeline(&self) -> Result<&Arc<InferencePipeline>, InferenceError> {
        match self {
            ServiceState::Ready(p) => Ok(p),
            ServiceState::Unavailable { reason } => Err(InferenceError::Unavailable(reason.clone())),
        }
    }

    pub fn infer(&self, url: &str) -> Result<PredictionResult, InferenceError> {
        self.pipeline()?.infer(url)
    }
}
