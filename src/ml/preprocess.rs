//! Column Preprocessing
//!
//! Numeric columns: median imputation then standard scaling.
//! Categorical columns: constant imputation then one-hot encoding, unknown categories ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ml::{FeaturePayload, ModelError};

/// Category substituted for absent or null categorical values.
pub const MISSING_CATEGORY: &str = "missing";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    /// Imputed when the value is absent or null
    pub median: f64,
    pub mean: f64,
    /// Standard deviation; zero is treated as one
    pub scale: f64,
}

impl NumericColumn {
    fn transform(&self, value: Option<&Value>) -> Result<f64, ModelError> {
        let raw = match value {
            None | Some(Value::Null) => self.median,
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| self.invalid("not representable as f64"))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| self.invalid(&format!("'{}' is not numeric", s)))?,
            Some(other) => return Err(self.invalid(&format!("expected a number, got {}", other))),
        };

        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        Ok((raw - self.mean) / scale)
    }

    fn invalid(&self, reason: &str) -> ModelError {
        ModelError::InvalidFeature {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    /// Categories seen during fitting, in encoding order
    pub categories: Vec<String>,
}

impl CategoricalColumn {
    fn encode_into(&self, value: Option<&Value>, out: &mut Vec<f64>) -> Result<(), ModelError> {
        let category = match value {
            None | Some(Value::Null) => MISSING_CATEGORY.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => {
                return Err(ModelError::InvalidFeature {
                    name: self.name.clone(),
                    reason: format!("expected a category, got {}", other),
                })
            }
        };

        out.extend(
            self.categories
                .iter()
                .map(|known| if *known == category { 1.0 } else { 0.0 }),
        );
        Ok(())
    }
}

// == Preprocessor ==
/// Fitted column transformer producing the regressor's input vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
}

impl Preprocessor {
    /// Length of the transformed vector.
    pub fn width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Transforms a payload. Attributes the preprocessor does not know are ignored.
    pub fn transform(&self, features: &FeaturePayload) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(self.width());

        for column in &self.numeric {
            out.push(column.transform(features.get(&column.name))?);
        }
        for column in &self.categorical {
            column.encode_into(features.get(&column.name), &mut out)?;
        }

        Ok(out)
    }
}
