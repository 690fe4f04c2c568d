//! Classifier seam: anything that maps a scaled feature row to a distribution over the classes.

use crate::error::ClassifierError;
use serde::Serialize;

/// Number of output classes
pub const CLASS_COUNT: usize = 4;

/// Trained network mapping a scaled 64-dim row to class probabilities.
/// Implementations are shared read-only across requests.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, scaled: &[f32]) -> Result<ClassProbabilities, ClassifierError>;
}

/// One probability per class index, as produced by the softmax output layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities([f32; CLASS_COUNT]);

impl ClassProbabilities {
    pub fn new(values: [f32; CLASS_COUNT]) -> Result<Self, ClassifierError> {
        if values.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::NonFinite);
        }
        Ok(Self(values))
    }

    pub fn from_slice(values: &[f32]) -> Result<Self, ClassifierError> {
        let arr: [f32; CLASS_COUNT] =
            values
                .try_into()
                .map_err(|_| ClassifierError::OutputShape {
                    expected: CLASS_COUNT,
                    actual: values.len(),
                })?;
        Self::new(arr)
    }

    pub fn values(&self) -> &[f32; CLASS_COUNT] {
        &self.0
    }

    /// Index of the highest probability; ties go to the lower index
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.0.iter().enumerate().skip(1) {
            if *p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn max(&self) -> f32 {
        self.0[self.argmax()]
    }

    pub fn percentages(&self) -> [f32; CLASS_COUNT] {
        self.0.map(|p| p * 100.0)
    }
}
