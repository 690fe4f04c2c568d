//! Lexical and structural feature extraction from raw URL strings.

mod extractor;
pub mod layout;
pub mod url_parts;

pub use extractor::{extract, FeatureExtractor};
pub use layout::{FEATURE_COUNT, FEATURE_NAMES};
pub use url_parts::{split_lossy, UrlParts};

/// Fixed-size feature vector for model input, in [`FEATURE_NAMES`] order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        layout::feature_index(name).map(|i| self.values[i])
    }

    /// Pairs each value with its layout name
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}
