//! Robust scaling: per-feature median centering and interquartile-range scaling.
//! Fitted once offline, persisted as JSON, read-only at serving time.

use crate::error::ArtifactError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    /// Feature names in fit order; labels positions, not used for lookup
    pub feature_names: Vec<String>,
    /// Per-feature median
    pub center: Vec<f32>,
    /// Per-feature interquartile range
    pub scale: Vec<f32>,
}

/// Linear interpolation between closest ranks over an ascending slice
fn quantile(sorted: &[f32], q: f64) -> f32 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = (pos - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl RobustScaler {
    /// Fit on a non-empty sample of extracted feature vectors.
    pub fn fit(samples: &[FeatureVector]) -> Result<Self, ArtifactError> {
        if samples.is_empty() {
            return Err(ArtifactError::Invalid(
                "cannot fit scaler on an empty sample".to_string(),
            ));
        }
        let flat: Vec<f32> = samples.iter().flat_map(|s| s.values).collect();
        let matrix = Array2::from_shape_vec((samples.len(), FEATURE_COUNT), flat)
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;

        let mut center = Vec::with_capacity(FEATURE_COUNT);
        let mut scale = Vec::with_capacity(FEATURE_COUNT);
        for column in matrix.axis_iter(Axis(1)) {
            let mut sorted = column.to_vec();
            sorted.sort_by(f32::total_cmp);
            center.push(quantile(&sorted, 0.5));
            let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
            scale.push(if iqr == 0.0 { 1.0 } else { iqr });
        }

        Ok(Self {
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            center,
            scale,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler: Self = serde_json::from_str(&data).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        scaler.validate()?;
        let mismatched = scaler.name_mismatches();
        if mismatched > 0 {
            tracing::warn!(
                path = %path.display(),
                mismatched,
                "scaler feature names differ from extractor layout; applying positionally"
            );
        }
        Ok(scaler)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let data = serde_json::to_string_pretty(self).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Feature count and order are frozen at fit time; reject anything else.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for (field, len) in [
            ("feature_names", self.feature_names.len()),
            ("center", self.center.len()),
            ("scale", self.scale.len()),
        ] {
            if len != FEATURE_COUNT {
                return Err(ArtifactError::Invalid(format!(
                    "scaler {field} has {len} entries, expected {FEATURE_COUNT}"
                )));
            }
        }
        if self
            .center
            .iter()
            .chain(self.scale.iter())
            .any(|x| !x.is_finite())
        {
            return Err(ArtifactError::Invalid(
                "scaler contains non-finite statistics".to_string(),
            ));
        }
        Ok(())
    }

    /// Positions whose stored name differs from the extractor layout
    pub fn name_mismatches(&self) -> usize {
        self.feature_names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .filter(|(a, b)| a.as_str() != **b)
            .count()
    }

    /// `(x - center) / scale`, with a zero scale treated as 1.
    pub fn transform(&self, features: &FeatureVector) -> Result<Vec<f32>, ArtifactError> {
        if self.center.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "scaler expects {} features, extractor produced {FEATURE_COUNT}",
                self.center.len()
            )));
        }
        Ok(features
            .values
            .iter()
            .zip(self.center.iter().zip(self.scale.iter()))
            .map(|(x, (c, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - c) / s
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;

    fn constant_vector(x: f32) -> FeatureVector {
        FeatureVector::from_values([x; FEATURE_COUNT])
    }

    #[test]
    fn fit_median_and_iqr() {
        // 1, 2, 3, 4, 5 → median 3, q25 2, q75 4
        let samples: Vec<_> = (1..=5).map(|i| constant_vector(i as f32)).collect();
        let s = RobustScaler::fit(&samples).unwrap();
        assert!(s.center.iter().all(|c| *c == 3.0));
        assert!(s.scale.iter().all(|c| *c == 2.0));
        let out = s.transform(&constant_vector(7.0)).unwrap();
        assert!(out.iter().all(|x| *x == 2.0));
    }

    #[test]
    fn fit_interpolates_between_ranks() {
        // 1, 2, 3, 4 → median 2.5, q25 1.75, q75 3.25
        let samples: Vec<_> = (1..=4).map(|i| constant_vector(i as f32)).collect();
        let s = RobustScaler::fit(&samples).unwrap();
        assert_eq!(s.center[0], 2.5);
        assert_eq!(s.scale[0], 1.5);
    }

    #[test]
    fn constant_feature_gets_unit_scale() {
        let samples = vec![
            extract("https://google.com"),
            extract("http://urgent-action-required-login.xyz"),
            extract("http://example.com/a/b"),
        ];
        let s = RobustScaler::fit(&samples).unwrap();
        use crate::features::layout::IDX_WEB_SSL_VALID;
        assert_eq!(s.center[IDX_WEB_SSL_VALID], 1.0);
        assert_eq!(s.scale[IDX_WEB_SSL_VALID], 1.0);
        let out = s.transform(&samples[0]).unwrap();
        assert_eq!(out[IDX_WEB_SSL_VALID], 0.0);
    }

    #[test]
    fn empty_sample_is_rejected() {
        assert!(RobustScaler::fit(&[]).is_err());
    }

    #[test]
    fn zero_scale_in_artifact_is_treated_as_one() {
        let mut s = RobustScaler::fit(&[constant_vector(1.0)]).unwrap();
        s.scale[0] = 0.0;
        let out = s.transform(&constant_vector(3.0)).unwrap();
        assert_eq!(out[0], 2.0);
    }

    #[test]
    fn save_load_and_reject_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let s = RobustScaler::fit(&[constant_vector(1.0), constant_vector(2.0)]).unwrap();
        s.save(&path).unwrap();
        assert_eq!(RobustScaler::load(&path).unwrap(), s);

        let mut short = s.clone();
        short.center.pop();
        short.save(&path).unwrap();
        assert!(matches!(
            RobustScaler::load(&path),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn renamed_features_apply_positionally() {
        let mut s = RobustScaler::fit(&[constant_vector(1.0), constant_vector(2.0)]).unwrap();
        assert_eq!(s.name_mismatches(), 0);
        s.feature_names[0] = "length_url".to_string();
        s.feature_names[5] = "qty_dot_url".to_string();
        assert!(s.validate().is_ok());
        assert_eq!(s.name_mismatches(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            RobustScaler::load(Path::new("nonexistent-scaler.json")),
            Err(ArtifactError::Io { .. })
        ));
    }
}
