//! Classifier models and the ordered model registry.
//!
//! Models here are inference-only: their parameters come from the offline
//! training pipeline through a [`ModelArtifact`]. Every model is registered
//! either as a probabilistic or as a deterministic [`Classifier`], together
//! with a [`ClassifierFamily`] tag that decides its selection penalty.

pub mod artifact;
pub mod classifier;
pub mod linear;
pub mod naive_bayes;
pub mod registry;
pub mod tree;

pub use artifact::{ModelArtifact, ModelEntry, ModelSpec};
pub use classifier::{Classifier, ClassifierFamily, DeterministicClassifier, ProbabilisticClassifier};
pub use linear::{LinearSvm, LogisticRegression};
pub use naive_bayes::MultinomialNaiveBayes;
pub use registry::{ModelRegistry, RegisteredModel};
pub use tree::{DecisionTree, RandomForest, TreeNode};
