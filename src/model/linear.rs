//! Linear models: logistic regression and linear SVM.
//!
//! Both keep one weight row per class. A two-class model may instead carry a
//! single row scoring the second class against the first.

use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::model::classifier::{
    DeterministicClassifier, ProbabilisticClassifier, argmax, check_dimension, softmax,
};
use crate::vocabulary::FeatureVector;

/// Shared weight layout of the linear models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWeights {
    /// Class labels.
    pub classes: Vec<String>,
    /// One coefficient row per class, or a single row for binary models.
    pub coef: Vec<Vec<f64>>,
    /// One intercept per coefficient row.
    pub intercept: Vec<f64>,
}

impl LinearWeights {
    fn validate(&self, model: &str) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(CaduceusError::artifact(format!("{model} has no classes")));
        }
        let expected_rows = if n_classes == 2 && self.coef.len() == 1 {
            1
        } else {
            n_classes
        };
        if self.coef.len() != expected_rows || self.intercept.len() != expected_rows {
            return Err(CaduceusError::artifact(format!(
                "{model} has {n_classes} classes but {} coefficient rows and {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }
        let n_features = self.coef[0].len();
        if self.coef.iter().any(|row| row.len() != n_features) {
            return Err(CaduceusError::artifact(format!(
                "{model} coefficient rows have different lengths"
            )));
        }
        Ok(())
    }

    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1 && self.classes.len() == 2
    }

    fn decision_function(&self, model: &str, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension(model, self.n_features(), features)?;
        Ok(self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + row.iter().zip(features.iter_f64()).map(|(w, x)| w * x).sum::<f64>())
            .collect())
    }
}

/// Multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(flatten)]
    pub weights: LinearWeights,
}

impl LogisticRegression {
    /// Create a model from explicit parameters.
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        let model = LogisticRegression {
            weights: LinearWeights {
                classes,
                coef,
                intercept,
            },
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that the parameter shapes agree.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate(self.display_name())
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.weights.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let decision = self.weights.decision_function(self.display_name(), features)?;
        if self.weights.is_binary() {
            let positive = 1.0 / (1.0 + (-decision[0]).exp());
            return Ok(vec![1.0 - positive, positive]);
        }
        Ok(softmax(&decision))
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.n_features())
    }

    fn display_name(&self) -> &str {
        "Logistic Regression"
    }
}

/// Linear support vector machine without probability calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvm {
    #[serde(flatten)]
    pub weights: LinearWeights,
}

impl LinearSvm {
    /// Create a model from explicit parameters.
    pub fn new(classes: Vec<String>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        let model = LinearSvm {
            weights: LinearWeights {
                classes,
                coef,
                intercept,
            },
        };
        model.validate()?;
        Ok(model)
    }

    /// Check that the parameter shapes agree.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate(self.display_name())
    }
}

impl DeterministicClassifier for LinearSvm {
    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let decision = self.weights.decision_function(self.display_name(), features)?;
        let idx = if self.weights.is_binary() {
            usize::from(decision[0] > 0.0)
        } else {
            argmax(&decision).ok_or_else(|| {
                CaduceusError::inference("Linear SVM produced no finite decision value")
            })?
        };
        self.weights
            .classes
            .get(idx)
            .cloned()
            .ok_or_else(|| CaduceusError::inference(format!("Linear SVM class {idx} out of range")))
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.n_features())
    }

    fn display_name(&self) -> &str {
        "Linear SVM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_logistic_regression_multiclass() {
        let model = LogisticRegression::new(
            labels(&["Common Cold", "Viral Fever"]),
            vec![vec![-1.0, 2.0], vec![2.0, -1.0]],
            vec![0.0, 0.0],
        )
        .unwrap();

        let proba = model
            .predict_proba(&FeatureVector::from_bits([1, 0]))
            .unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(
            model.predict(&FeatureVector::from_bits([1, 0])).unwrap(),
            "Viral Fever"
        );
        assert_eq!(
            model.predict(&FeatureVector::from_bits([0, 1])).unwrap(),
            "Common Cold"
        );
    }

    #[test]
    fn test_logistic_regression_binary_row() {
        let model =
            LogisticRegression::new(labels(&["no", "yes"]), vec![vec![3.0]], vec![-1.0]).unwrap();
        let proba = model.predict_proba(&FeatureVector::from_bits([1])).unwrap();
        assert!(proba[1] > 0.8);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_svm_predicts_label() {
        let model = LinearSvm::new(
            labels(&["Common Cold", "Viral Fever"]),
            vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
            vec![0.0, 0.0],
        )
        .unwrap();
        assert_eq!(
            model.predict(&FeatureVector::from_bits([1, 0])).unwrap(),
            "Viral Fever"
        );
    }

    #[test]
    fn test_shape_validation() {
        let result = LinearSvm::new(labels(&["a", "b", "c"]), vec![vec![1.0]], vec![0.0]);
        assert!(matches!(result, Err(CaduceusError::Artifact(_))));
    }

    #[test]
    fn test_weights_deserialize_flattened() {
        let json = r#"{"classes": ["a", "b"], "coef": [[1.0], [-1.0]], "intercept": [0.0, 0.0]}"#;
        let model: LogisticRegression = serde_json::from_str(json).unwrap();
        assert_eq!(model.weights.classes, vec!["a", "b"]);
        assert!(model.validate().is_ok());
    }
}
