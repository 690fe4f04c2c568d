//! Rule-based corrections around the classifier: trusted-domain bypass before it,
//! low-confidence phishing guardrails after it. Same rules for every front end.

use crate::config::HeuristicsConfig;
use crate::features::split_lossy;
use crate::model::UrlClass;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    /// Authority matched the allow-list; classifier skipped
    TrustedDomain,
    /// PHISHING under the suspicion threshold on a shallow, query-less URL
    LowSuspicion,
    /// PHISHING under the confidence threshold
    LowConfidence,
}

impl OverrideRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideRule::TrustedDomain => "trusted_domain",
            OverrideRule::LowSuspicion => "low_suspicion",
            OverrideRule::LowConfidence => "low_confidence",
        }
    }
}

pub struct HeuristicPolicy {
    config: HeuristicsConfig,
}

impl HeuristicPolicy {
    pub fn new(config: HeuristicsConfig) -> Self {
        Self { config }
    }

    /// Policy from config, or `None` when the layer is switched off
    pub fn from_config(config: &HeuristicsConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config.clone()))
    }

    /// Allow-listed domain contained in the URL's host (or host-like leading path segment)
    pub fn trusted_match(&self, url: &str) -> Option<&str> {
        let domain = split_lossy(url).domain_candidate();
        if domain.is_empty() {
            return None;
        }
        self.config
            .trusted_domains
            .iter()
            .find(|t| !t.is_empty() && domain.contains(&t.to_lowercase()))
            .map(String::as_str)
    }

    /// Post-classification guardrail. `confidence` is the winning probability in percent.
    pub fn review(&self, url: &str, predicted: UrlClass, confidence: f32) -> Option<OverrideRule> {
        if predicted != UrlClass::Phishing {
            return None;
        }
        let shallow = url.matches('/').count() <= self.config.shallow_max_slashes;
        let has_query = url.contains('?');
        if confidence < self.config.low_suspicion_threshold && shallow && !has_query {
            Some(OverrideRule::LowSuspicion)
        } else if confidence < self.config.low_confidence_threshold {
            Some(OverrideRule::LowConfidence)
        } else {
            None
        }
    }
}
