//! Random Forest Regressor
//!
//! Trees use the flat parallel-array layout: node `i` is a leaf when
//! `children_left[i] == -1`, otherwise traversal goes left when
//! `x[feature[i]] <= threshold[i]`.

use serde::{Deserialize, Serialize};

use crate::ml::ModelError;

const LEAF: i64 = -1;

// == Decision Tree ==
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Node outputs; only leaf entries are read
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// Checks the layout so that [`DecisionTree::predict`] cannot index out of
    /// bounds or loop. Children must come after their parent.
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(ModelError::InvalidArtifact("tree has no nodes".to_string()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(ModelError::InvalidArtifact(
                "tree arrays have mismatched lengths".to_string(),
            ));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {} has exactly one child",
                        i
                    )));
                }
                if !self.value[i].is_finite() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "leaf {} has a non-finite value",
                        i
                    )));
                }
                continue;
            }

            let in_range = |child: i64| child > i as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} has an out-of-order child",
                    i
                )));
            }
            if self.feature[i] < 0 || self.feature[i] as usize >= n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} splits on feature {} of {}",
                    i, self.feature[i], n_features
                )));
            }
        }

        Ok(())
    }

    /// Walks from the root to a leaf. Assumes a validated tree.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

// == Random Forest ==
/// Averages the outputs of its trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "forest has no trees".to_string(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features).map_err(|err| {
                ModelError::InvalidArtifact(format!("tree {}: {}", i, err))
            })?;
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        total / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x0 <= 0.5 ? 10 : (x1 <= 0 ? 20 : 30)
    fn tree() -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![0.5, -2.0, 0.0, -2.0, -2.0],
            value: vec![20.0, 10.0, 25.0, 20.0, 30.0],
        }
    }

    fn stump(value: f64) -> DecisionTree {
        DecisionTree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    #[test]
    fn test_tree_traversal() {
        let tree = tree();
        tree.validate(2).unwrap();

        assert_eq!(tree.predict(&[0.5, 9.0]), 10.0);
        assert_eq!(tree.predict(&[0.6, 0.0]), 20.0);
        assert_eq!(tree.predict(&[0.6, 0.1]), 30.0);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest {
            trees: vec![tree(), stump(40.0)],
        };
        forest.validate(2).unwrap();

        assert_eq!(forest.predict(&[0.0, 0.0]), 25.0);
    }

    #[test]
    fn test_validate_rejects_bad_feature_index() {
        assert!(tree().validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let mut tree = tree();
        tree.children_left[2] = 0;
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn test_validate_rejects_ragged_arrays() {
        let mut tree = tree();
        tree.value.pop();
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        assert!(RandomForest { trees: vec![] }.validate(2).is_err());
    }
}
