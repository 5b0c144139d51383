//! Model Artifact
//!
//! Serialized preprocessing + regression pipeline, loaded once at startup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ml::{FeaturePayload, ModelError, PriceModel, Preprocessor, RandomForest};

// == Model Artifact ==
/// Immutable fitted pipeline: column preprocessor followed by a random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Free-form identifier recorded by the training job
    #[serde(default)]
    pub version: String,
    pub preprocessor: Preprocessor,
    pub regressor: RandomForest,
}

impl ModelArtifact {
    // == Load ==
    /// Reads, parses and validates the artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            version = %artifact.version,
            trees = artifact.regressor.trees.len(),
            features = artifact.preprocessor.width(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Parses and validates an artifact document.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let width = self.preprocessor.width();
        if width == 0 {
            return Err(ModelError::InvalidArtifact(
                "preprocessor produces no features".to_string(),
            ));
        }
        self.regressor.validate(width)
    }
}

impl PriceModel for ModelArtifact {
    fn predict(&self, features: &FeaturePayload) -> Result<f64, ModelError> {
        let x = self.preprocessor.transform(features)?;
        Ok(self.regressor.predict(&x))
    }
}
