//! Regressor evaluation.
//!
//! The serving path only needs one primitive: score an aligned feature row.
//! Two portable model kinds are supported:
//! - gradient-boosted tree ensembles (positional features, `x < threshold` goes to `yes`)
//! - linear models (intercept + weights)

use serde::{Deserialize, Serialize};

/// Anything that can turn an aligned feature row into a raw prediction.
///
/// `row[i]` holds the value of `feature_names()[i]`.
pub trait Scorer: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn score(&self, row: &[f64]) -> f64;
}

/// Serialized regressor, as written to `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root; children always have a larger index than their parent.
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        /// Branch taken for NaN inputs (defaults to `yes`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<usize>,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl Regressor {
    /// Structural checks run once at load time so scoring can index freely.
    pub fn validate(&self) -> Result<(), String> {
        let names = self.feature_names();
        if names.is_empty() {
            return Err("model declares no feature names".to_string());
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(format!("duplicate feature name '{name}'"));
            }
        }

        match self {
            Regressor::TreeEnsemble(ensemble) => {
                if !ensemble.base_score.is_finite() {
                    return Err("non-finite base_score".to_string());
                }
                for (t, tree) in ensemble.trees.iter().enumerate() {
                    tree.validate(names.len())
                        .map_err(|e| format!("tree {t}: {e}"))?;
                }
                Ok(())
            }
            Regressor::Linear(linear) => {
                if linear.weights.len() != names.len() {
                    return Err(format!(
                        "{} weights for {} features",
                        linear.weights.len(),
                        names.len()
                    ));
                }
                if !linear.intercept.is_finite() || linear.weights.iter().any(|w| !w.is_finite()) {
                    return Err("non-finite coefficient".to_string());
                }
                Ok(())
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Regressor::TreeEnsemble(_) => "tree_ensemble",
            Regressor::Linear(_) => "linear",
        }
    }
}

impl Scorer for Regressor {
    fn feature_names(&self) -> &[String] {
        match self {
            Regressor::TreeEnsemble(ensemble) => &ensemble.feature_names,
            Regressor::Linear(linear) => &linear.feature_names,
        }
    }

    fn score(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), self.feature_names().len());
        match self {
            Regressor::TreeEnsemble(ensemble) => {
                ensemble.base_score + ensemble.trees.iter().map(|t| t.leaf_value(row)).sum::<f64>()
            }
            Regressor::Linear(linear) => {
                linear.intercept
                    + linear
                        .weights
                        .iter()
                        .zip(row)
                        .map(|(w, x)| w * x)
                        .sum::<f64>()
            }
        }
    }
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {idx}: feature index {feature} out of range"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx}: non-finite threshold"));
                    }
                    for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
                        if child <= idx || child >= n {
                            return Err(format!("node {idx}: invalid child index {child}"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {idx}: non-finite leaf value"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    idx = if x.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}
