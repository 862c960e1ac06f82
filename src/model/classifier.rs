//! Classifier capabilities.
//!
//! A classifier is registered as one of two variants, chosen once at
//! registration time: probabilistic classifiers report a distribution over
//! their labels, deterministic ones report only a label. The scorer dispatches
//! on the variant instead of probing capabilities at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::vocabulary::FeatureVector;

/// Behavioral category of a classifier, used to look up its selection penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierFamily {
    /// Averaging ensembles with calibrated-ish probabilities (random forests).
    ProbabilisticEnsemble,
    /// Single decision trees, prone to near-100% confidence.
    TreeBased,
    /// Naive Bayes style models.
    NaiveBayes,
    /// Anything else.
    Other,
}

impl fmt::Display for ClassifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassifierFamily::ProbabilisticEnsemble => "probabilistic_ensemble",
            ClassifierFamily::TreeBased => "tree_based",
            ClassifierFamily::NaiveBayes => "naive_bayes",
            ClassifierFamily::Other => "other",
        };
        f.write_str(name)
    }
}

/// A classifier that reports a probability for every known label.
pub trait ProbabilisticClassifier: Send + Sync + fmt::Debug {
    /// Labels, aligned with the output of [`predict_proba`](Self::predict_proba).
    fn classes(&self) -> &[String];

    /// Probability distribution over [`classes`](Self::classes).
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// Most probable label. Ties resolve to the first class.
    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let proba = self.predict_proba(features)?;
        argmax(&proba)
            .and_then(|idx| self.classes().get(idx).cloned())
            .ok_or_else(|| {
                CaduceusError::inference(format!(
                    "{} produced an empty probability distribution",
                    self.display_name()
                ))
            })
    }

    /// Expected feature vector length, if the model knows it.
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Human-readable model kind, e.g. "Random Forest".
    fn display_name(&self) -> &str;
}

/// A classifier that only reports a label.
pub trait DeterministicClassifier: Send + Sync + fmt::Debug {
    /// Predicted label.
    fn predict(&self, features: &FeatureVector) -> Result<String>;

    /// Expected feature vector length, if the model knows it.
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Human-readable model kind, e.g. "Linear SVM".
    fn display_name(&self) -> &str;
}

/// A registered classifier.
#[derive(Debug)]
pub enum Classifier {
    /// Reports a label and a probability distribution.
    Probabilistic(Box<dyn ProbabilisticClassifier>),
    /// Reports only a label.
    Deterministic(Box<dyn DeterministicClassifier>),
}

impl Classifier {
    /// Wrap a probabilistic classifier.
    pub fn probabilistic<C: ProbabilisticClassifier + 'static>(classifier: C) -> Self {
        Classifier::Probabilistic(Box::new(classifier))
    }

    /// Wrap a deterministic classifier.
    pub fn deterministic<C: DeterministicClassifier + 'static>(classifier: C) -> Self {
        Classifier::Deterministic(Box::new(classifier))
    }

    /// Human-readable model kind.
    pub fn display_name(&self) -> &str {
        match self {
            Classifier::Probabilistic(c) => c.display_name(),
            Classifier::Deterministic(c) => c.display_name(),
        }
    }

    /// Expected feature vector length, if known.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::Probabilistic(c) => c.n_features(),
            Classifier::Deterministic(c) => c.n_features(),
        }
    }

    /// Whether this classifier reports probabilities.
    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Classifier::Probabilistic(_))
    }
}

/// Index of the first maximal finite value.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Fail with an inference error when a vector does not have the expected length.
pub(crate) fn check_dimension(model: &str, expected: usize, features: &FeatureVector) -> Result<()> {
    if features.len() != expected {
        return Err(CaduceusError::inference(format!(
            "{model} expects {expected} features, got {}",
            features.len()
        )));
    }
    Ok(())
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[f64::NAN, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let proba = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = proba.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(proba[2] > proba[1] && proba[1] > proba[0]);
    }

    #[test]
    fn test_family_display() {
        assert_eq!(ClassifierFamily::TreeBased.to_string(), "tree_based");
        let family: ClassifierFamily = serde_json::from_str("\"naive_bayes\"").unwrap();
        assert_eq!(family, ClassifierFamily::NaiveBayes);
    }
}
