//! Label mapping: model output index ↔ URL class. Fitted with the model, reused verbatim at serving.

use super::classifier::CLASS_COUNT;
use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrlClass {
    Benign,
    Malware,
    Phishing,
    Defacement,
}

impl UrlClass {
    pub const ALL: [UrlClass; CLASS_COUNT] = [
        UrlClass::Benign,
        UrlClass::Malware,
        UrlClass::Phishing,
        UrlClass::Defacement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrlClass::Benign => "BENIGN",
            UrlClass::Malware => "MALWARE",
            UrlClass::Phishing => "PHISHING",
            UrlClass::Defacement => "DEFACEMENT",
        }
    }
}

impl fmt::Display for UrlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlClass {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UrlClass::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ArtifactError::Invalid(format!("unknown class label: {s:?}")))
    }
}

/// On-disk shape: `{"classes": ["BENIGN", "MALWARE", "PHISHING", "DEFACEMENT"]}`
#[derive(Debug, Serialize, Deserialize)]
struct LabelFile {
    classes: Vec<String>,
}

/// Bijection between the model's output index and [`UrlClass`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    classes: [UrlClass; CLASS_COUNT],
}

impl Default for LabelMap {
    fn default() -> Self {
        Self {
            classes: UrlClass::ALL,
        }
    }
}

impl LabelMap {
    /// Build from class names in output-index order. Exactly four, each class once.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ArtifactError> {
        if names.len() != CLASS_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "label map has {} classes, expected {CLASS_COUNT}",
                names.len()
            )));
        }
        let mut classes = UrlClass::ALL;
        for (slot, name) in classes.iter_mut().zip(names) {
            *slot = name.as_ref().parse()?;
        }
        for (i, c) in classes.iter().enumerate() {
            if classes[..i].contains(c) {
                return Err(ArtifactError::Invalid(format!(
                    "label map lists {c} more than once"
                )));
            }
        }
        Ok(Self { classes })
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LabelFile = serde_json::from_str(&data).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_names(&file.classes)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let file = LabelFile {
            classes: self.classes.iter().map(|c| c.to_string()).collect(),
        };
        let data = serde_json::to_string_pretty(&file).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, data).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn class_of(&self, index: usize) -> Option<UrlClass> {
        self.classes.get(index).copied()
    }

    pub fn index_of(&self, class: UrlClass) -> usize {
        // Bijective by construction
        self.classes.iter().position(|c| *c == class).unwrap_or(0)
    }

    /// Classes in output-index order
    pub fn classes(&self) -> &[UrlClass; CLASS_COUNT] {
        &self.classes
    }
}
