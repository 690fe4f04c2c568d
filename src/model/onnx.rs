//! ONNX Runtime classifier. Input: [1, 64] f32 scaled features, Output: 4 class probabilities.
//! The trained network is exported to ONNX; a missing or unreadable model is a load error.

use super::classifier::{ClassProbabilities, Classifier};
use crate::error::{ArtifactError, ClassifierError};
use crate::features::FEATURE_COUNT;
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxClassifier {
    // Session::run needs exclusive access; requests are serialized here
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxClassifier {
    /// Load model from path.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "model file not found"),
            });
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Model(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Model(format!("optimization level: {e}")))?
            .commit_from_file(path)
            .map_err(|e| ArtifactError::Model(format!("{}: {e}", path.display())))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, ArtifactError> {
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactError::Model("model defines no outputs".to_string()))?;

        tracing::debug!(output = %output_name, "ONNX classifier ready");
        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_proba(&self, scaled: &[f32]) -> Result<ClassProbabilities, ClassifierError> {
        if scaled.len() != FEATURE_COUNT {
            return Err(ClassifierError::InputShape {
                expected: FEATURE_COUNT,
                actual: scaled.len(),
            });
        }

        let arr = Array2::from_shape_vec((1, FEATURE_COUNT), scaled.to_vec())
            .map_err(|e| ClassifierError::Session(format!("input array: {e}")))?;
        let input = Tensor::from_array(arr)
            .map_err(|e| ClassifierError::Session(format!("input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Session("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifierError::Session(format!("inference failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ClassifierError::Session(format!("missing output {}", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Session(format!("output tensor: {e}")))?;

        ClassProbabilities::from_slice(data)
    }
}
