//! Inference artifacts: robust scaler, label mapping, and the trained classifier.

mod classifier;
mod labels;
mod onnx;
mod scaler;

pub use classifier::{ClassProbabilities, Classifier, CLASS_COUNT};
pub use labels::{LabelMap, UrlClass};
pub use onnx::OnnxClassifier;
pub use scaler::RobustScaler;
