use serde::{Deserialize, Serialize};

use super::{check_inputs, ArtifactError, FittedModel};

/// Serialized premium estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Boosted regression trees: `base_score` plus the leaf reached in every tree.
    TreeEnsemble {
        feature_names: Vec<String>,
        base_score: f64,
        trees: Vec<RegressionTree>,
    },
}

/// Flattened tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Values strictly below `threshold` follow `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn validate(&self, width: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::invalid("tree", "no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                threshold,
            } = node
            {
                if *feature >= width {
                    return Err(ArtifactError::invalid(
                        "tree",
                        format!("node {index} splits on feature {feature} of {width}"),
                    ));
                }
                // children always sit after their parent, so every walk terminates
                let in_range = |child: usize| child > index && child < self.nodes.len();
                if !in_range(*left) || !in_range(*right) {
                    return Err(ArtifactError::invalid(
                        "tree",
                        format!("node {index} has out-of-order children {left}/{right}"),
                    ));
                }
                if !threshold.is_finite() {
                    return Err(ArtifactError::invalid(
                        "tree",
                        format!("node {index} has a non-finite threshold"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl ModelArtifact {
    pub fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Linear { feature_names, .. }
            | ModelArtifact::TreeEnsemble { feature_names, .. } => feature_names,
        }
    }

    /// Check internal consistency and that the model was fitted on `expected` columns in order.
    pub fn validate(&self, expected: &[&str]) -> Result<(), ArtifactError> {
        let names = self.feature_names();
        if names.len() != expected.len() || names.iter().zip(expected).any(|(a, b)| a != b) {
            return Err(ArtifactError::FeatureMismatch {
                expected: expected.iter().map(|name| name.to_string()).collect(),
                actual: names.to_vec(),
            });
        }

        match self {
            ModelArtifact::Linear {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.len() != names.len() {
                    return Err(ArtifactError::invalid(
                        "linear model",
                        format!(
                            "{} coefficients for {} features",
                            coefficients.len(),
                            names.len()
                        ),
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ArtifactError::invalid("linear model", "non-finite weight"));
                }
            }
            ModelArtifact::TreeEnsemble {
                base_score, trees, ..
            } => {
                if !base_score.is_finite() {
                    return Err(ArtifactError::invalid(
                        "tree ensemble",
                        "non-finite base score",
                    ));
                }
                for tree in trees {
                    tree.validate(names.len())?;
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            ModelArtifact::Linear {
                coefficients,
                intercept,
                ..
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(row)
                        .map(|(weight, value)| weight * value)
                        .sum::<f64>()
            }
            ModelArtifact::TreeEnsemble {
                base_score, trees, ..
            } => base_score + trees.iter().map(|tree| tree.evaluate(row)).sum::<f64>(),
        }
    }
}

impl FittedModel for ModelArtifact {
    /// The artifact is validated on every call, not only when loaded from disk.
    fn predict(&self, columns: &[&str], rows: &[Vec<f64>]) -> Result<Vec<f64>, ArtifactError> {
        self.validate(columns)?;
        check_inputs(self.feature_names(), columns, rows)?;
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }
}
