//! Decision trees and random forests over binary symptom vectors.

use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::model::classifier::ProbabilisticClassifier;
use crate::vocabulary::FeatureVector;

/// A node of an array-encoded binary tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Training class counts (or weights) that reached this leaf.
    Leaf { counts: Vec<f64> },
}

/// Decision tree classifier. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Class labels, aligned with leaf counts.
    pub classes: Vec<String>,
    /// Tree nodes.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Create a tree from explicit nodes.
    pub fn new(classes: Vec<String>, nodes: Vec<TreeNode>) -> Result<Self> {
        let tree = DecisionTree { classes, nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Check node references and leaf shapes.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(CaduceusError::artifact("decision tree has no classes"));
        }
        if self.nodes.is_empty() {
            return Err(CaduceusError::artifact("decision tree has no nodes"));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { left, right, .. } => {
                    // Children always come after their parent, which also rules out cycles.
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(CaduceusError::artifact(format!(
                                "decision tree node {idx} has invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { counts } => {
                    if counts.len() != self.classes.len() {
                        return Err(CaduceusError::artifact(format!(
                            "decision tree leaf {idx} has {} counts for {} classes",
                            counts.len(),
                            self.classes.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, features: &FeatureVector) -> Result<&[f64]> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { counts }) => return Ok(counts),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.as_slice().get(*feature).ok_or_else(|| {
                        CaduceusError::inference(format!(
                            "decision tree splits on feature {feature} but the vector has {}",
                            features.len()
                        ))
                    })?;
                    let next = if f64::from(*value) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= idx {
                        return Err(CaduceusError::inference(format!(
                            "decision tree node {idx} points backwards to {next}"
                        )));
                    }
                    idx = next;
                }
                None => {
                    return Err(CaduceusError::inference(format!(
                        "decision tree node {idx} does not exist"
                    )));
                }
            }
        }
    }

    fn leaf_distribution(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let counts = self.leaf(features)?;
        let total: f64 = counts.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(CaduceusError::inference("decision tree leaf is empty"));
        }
        Ok(counts.iter().map(|c| c / total).collect())
    }
}

impl ProbabilisticClassifier for DecisionTree {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        self.leaf_distribution(features)
    }

    fn display_name(&self) -> &str {
        "Decision Tree"
    }
}

/// Random forest: the average of its trees' leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Class labels shared by every tree.
    pub classes: Vec<String>,
    /// Member trees.
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Create a forest from trees sharing the same class list.
    pub fn new(classes: Vec<String>, trees: Vec<DecisionTree>) -> Result<Self> {
        let forest = RandomForest { classes, trees };
        forest.validate()?;
        Ok(forest)
    }

    /// Check every tree and that all share the forest's classes.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(CaduceusError::artifact("random forest has no trees"));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate()?;
            if tree.classes != self.classes {
                return Err(CaduceusError::artifact(format!(
                    "random forest tree {idx} has a different class list"
                )));
            }
        }
        Ok(())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (sum, p) in proba.iter_mut().zip(tree.leaf_distribution(features)?) {
                *sum += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n_trees).collect())
    }

    fn display_name(&self) -> &str {
        "Random Forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["Common Cold".to_string(), "Viral Fever".to_string()]
    }

    /// Splits on feature 0 (fever).
    fn fever_stump(fever_leaf: Vec<f64>, other_leaf: Vec<f64>) -> DecisionTree {
        DecisionTree::new(
            classes(),
            vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { counts: other_leaf },
                TreeNode::Leaf { counts: fever_leaf },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_tree_follows_splits() {
        let tree = fever_stump(vec![0.0, 10.0], vec![8.0, 2.0]);
        let proba = tree
            .predict_proba(&FeatureVector::from_bits([1, 0]))
            .unwrap();
        assert_eq!(proba, vec![0.0, 1.0]);
        assert_eq!(
            tree.predict(&FeatureVector::from_bits([0, 1])).unwrap(),
            "Common Cold"
        );
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = RandomForest::new(
            classes(),
            vec![
                fever_stump(vec![0.0, 10.0], vec![10.0, 0.0]),
                fever_stump(vec![5.0, 5.0], vec![10.0, 0.0]),
            ],
        )
        .unwrap();
        let proba = forest
            .predict_proba(&FeatureVector::from_bits([1, 0]))
            .unwrap();
        assert!((proba[1] - 0.75).abs() < 1e-9);
        assert_eq!(
            forest.predict(&FeatureVector::from_bits([1, 0])).unwrap(),
            "Viral Fever"
        );
    }

    #[test]
    fn test_out_of_range_feature_is_inference_error() {
        let tree = fever_stump(vec![0.0, 1.0], vec![1.0, 0.0]);
        let empty = FeatureVector::zeros(0);
        assert!(matches!(
            tree.predict_proba(&empty),
            Err(CaduceusError::Inference(_))
        ));
    }

    #[test]
    fn test_rejects_backward_child() {
        let result = DecisionTree::new(
            classes(),
            vec![TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 0,
            }],
        );
        assert!(matches!(result, Err(CaduceusError::Artifact(_))));
    }

    #[test]
    fn test_node_serialization() {
        let json = r#"{"kind": "split", "feature": 2, "threshold": 0.5, "left": 1, "right": 2}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert!(matches!(node, TreeNode::Split { feature: 2, .. }));
    }
}
