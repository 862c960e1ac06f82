//! Multinomial naive Bayes over binary symptom vectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::model::classifier::{ProbabilisticClassifier, check_dimension, softmax};
use crate::vocabulary::FeatureVector;

/// Multinomial naive Bayes classifier.
///
/// Parameters are stored in log space, one row per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// Class labels.
    pub classes: Vec<String>,
    /// Log prior probability of each class.
    pub class_log_prior: Vec<f64>,
    /// Log probability of each feature given each class.
    pub feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    /// Create a model from explicit parameters.
    pub fn new(
        classes: Vec<String>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let model = MultinomialNaiveBayes {
            classes,
            class_log_prior,
            feature_log_prob,
        };
        model.validate()?;
        Ok(model)
    }

    /// Estimate parameters from labelled vectors with additive smoothing.
    ///
    /// Classes are ordered lexicographically.
    pub fn fit(samples: &[(FeatureVector, String)], alpha: f64) -> Result<Self> {
        let Some((first, _)) = samples.first() else {
            return Err(CaduceusError::other("Training samples cannot be empty"));
        };
        if alpha.is_nan() || alpha <= 0.0 {
            return Err(CaduceusError::other("Smoothing alpha must be positive"));
        }
        let n_features = first.len();

        let mut per_class: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (features, label) in samples {
            check_dimension("Naive Bayes", n_features, features)
                .map_err(|e| CaduceusError::other(e.to_string()))?;
            let (count, feature_count) = per_class
                .entry(label.as_str())
                .or_insert_with(|| (0, vec![0.0; n_features]));
            *count += 1;
            for (total, value) in feature_count.iter_mut().zip(features.iter_f64()) {
                *total += value;
            }
        }

        let n_samples = samples.len() as f64;
        let mut classes = Vec::with_capacity(per_class.len());
        let mut class_log_prior = Vec::with_capacity(per_class.len());
        let mut feature_log_prob = Vec::with_capacity(per_class.len());

        for (label, (count, feature_count)) in per_class {
            classes.push(label.to_string());
            class_log_prior.push((count as f64 / n_samples).ln());

            let denominator: f64 = feature_count.iter().sum::<f64>() + alpha * n_features as f64;
            feature_log_prob.push(
                feature_count
                    .iter()
                    .map(|c| ((c + alpha) / denominator).ln())
                    .collect(),
            );
        }

        Self::new(classes, class_log_prior, feature_log_prob)
    }

    /// Check that the parameter shapes agree.
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(CaduceusError::artifact("naive Bayes model has no classes"));
        }
        if self.class_log_prior.len() != n_classes || self.feature_log_prob.len() != n_classes {
            return Err(CaduceusError::artifact(format!(
                "naive Bayes model has {n_classes} classes but {} priors and {} feature rows",
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        let n_features = self.feature_log_prob[0].len();
        if self.feature_log_prob.iter().any(|row| row.len() != n_features) {
            return Err(CaduceusError::artifact(
                "naive Bayes feature rows have different lengths",
            ));
        }
        Ok(())
    }
}

impl ProbabilisticClassifier for MultinomialNaiveBayes {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let n_features = self.feature_log_prob.first().map_or(0, Vec::len);
        check_dimension(self.display_name(), n_features, features)?;

        let joint_log_likelihood: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                prior
                    + row
                        .iter()
                        .zip(features.iter_f64())
                        .map(|(log_prob, x)| log_prob * x)
                        .sum::<f64>()
            })
            .collect();

        Ok(softmax(&joint_log_likelihood))
    }

    fn n_features(&self) -> Option<usize> {
        self.feature_log_prob.first().map(Vec::len)
    }

    fn display_name(&self) -> &str {
        "Naive Bayes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<(FeatureVector, String)> {
        // features: fever, headache, chills, cough, sneezing
        vec![
            (FeatureVector::from_bits([1, 1, 1, 0, 0]), "Viral Fever".to_string()),
            (FeatureVector::from_bits([1, 1, 0, 0, 0]), "Viral Fever".to_string()),
            (FeatureVector::from_bits([1, 0, 1, 0, 0]), "Viral Fever".to_string()),
            (FeatureVector::from_bits([0, 0, 0, 1, 1]), "Common Cold".to_string()),
            (FeatureVector::from_bits([0, 1, 0, 1, 1]), "Common Cold".to_string()),
        ]
    }

    #[test]
    fn test_fit_and_predict() {
        let model = MultinomialNaiveBayes::fit(&samples(), 1.0).unwrap();
        assert_eq!(model.classes, vec!["Common Cold", "Viral Fever"]);

        let fever = FeatureVector::from_bits([1, 1, 1, 0, 0]);
        assert_eq!(model.predict(&fever).unwrap(), "Viral Fever");

        let cold = FeatureVector::from_bits([0, 0, 0, 1, 1]);
        assert_eq!(model.predict(&cold).unwrap(), "Common Cold");
    }

    #[test]
    fn test_probabilities_are_a_distribution() {
        let model = MultinomialNaiveBayes::fit(&samples(), 1.0).unwrap();
        let proba = model
            .predict_proba(&FeatureVector::from_bits([1, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_dimension_mismatch_is_inference_error() {
        let model = MultinomialNaiveBayes::fit(&samples(), 1.0).unwrap();
        let result = model.predict_proba(&FeatureVector::from_bits([1, 0]));
        assert!(matches!(result, Err(CaduceusError::Inference(_))));
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        let result = MultinomialNaiveBayes::new(
            vec!["a".to_string(), "b".to_string()],
            vec![0.5f64.ln()],
            vec![vec![0.0], vec![0.0]],
        );
        assert!(matches!(result, Err(CaduceusError::Artifact(_))));
    }
}
