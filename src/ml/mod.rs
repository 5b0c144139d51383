//! Model Module
//!
//! The pre-trained price model: a column preprocessor feeding a random forest
//! regressor, loaded once from a JSON artifact and shared read-only.

mod artifact;
mod forest;
mod preprocess;

use thiserror::Error;

pub use artifact::ModelArtifact;
pub use forest::{DecisionTree, RandomForest};
pub use preprocess::{CategoricalColumn, NumericColumn, Preprocessor, MISSING_CATEGORY};

/// Attribute name to value, in the order the client sent them.
pub type FeaturePayload = serde_json::Map<String, serde_json::Value>;

// == Model Error ==
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact file could not be read
    #[error("failed to read model artifact '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Artifact file is not a valid document
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact parsed but is structurally unusable
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// A feature value cannot be transformed
    #[error("invalid value for feature '{name}': {reason}")]
    InvalidFeature { name: String, reason: String },
}

// == Price Model ==
/// Anything that turns a feature payload into a price estimate.
pub trait PriceModel: Send + Sync {
    fn predict(&self, features: &FeaturePayload) -> Result<f64, ModelError>;
}
