//! Persisted model artifact.
//!
//! The artifact is a JSON bundle produced by the offline training pipeline:
//!
//! ```json
//! {
//!   "symptoms": ["chills", "fever", "headache"],
//!   "primary": "Random Forest",
//!   "models": [
//!     {"name": "Naive Bayes", "accuracy": 0.86, "model": {"type": "multinomial_naive_bayes", "...": "..."}},
//!     {"name": "Random Forest", "family": "probabilistic_ensemble", "model": {"type": "random_forest", "...": "..."}}
//!   ]
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::model::classifier::{Classifier, ClassifierFamily};
use crate::model::linear::{LinearSvm, LogisticRegression};
use crate::model::naive_bayes::MultinomialNaiveBayes;
use crate::model::registry::{ModelRegistry, RegisteredModel};
use crate::model::tree::{DecisionTree, RandomForest};
use crate::vocabulary::SymptomVocabulary;

/// Model parameters, tagged by model kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    MultinomialNaiveBayes(MultinomialNaiveBayes),
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    LinearSvm(LinearSvm),
}

impl ModelSpec {
    /// Family tag used when the artifact does not name one.
    pub fn default_family(&self) -> ClassifierFamily {
        match self {
            ModelSpec::MultinomialNaiveBayes(_) => ClassifierFamily::NaiveBayes,
            ModelSpec::DecisionTree(_) => ClassifierFamily::TreeBased,
            ModelSpec::RandomForest(_) => ClassifierFamily::ProbabilisticEnsemble,
            ModelSpec::LogisticRegression(_) | ModelSpec::LinearSvm(_) => ClassifierFamily::Other,
        }
    }

    /// Validate the parameters and wrap them in the matching classifier variant.
    pub fn into_classifier(self) -> Result<Classifier> {
        Ok(match self {
            ModelSpec::MultinomialNaiveBayes(m) => {
                m.validate()?;
                Classifier::probabilistic(m)
            }
            ModelSpec::LogisticRegression(m) => {
                m.validate()?;
                Classifier::probabilistic(m)
            }
            ModelSpec::DecisionTree(m) => {
                m.validate()?;
                Classifier::probabilistic(m)
            }
            ModelSpec::RandomForest(m) => {
                m.validate()?;
                Classifier::probabilistic(m)
            }
            ModelSpec::LinearSvm(m) => {
                m.validate()?;
                Classifier::deterministic(m)
            }
        })
    }
}

/// One named model in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Registered name, e.g. "Random Forest".
    pub name: String,
    /// Explicit family tag; defaults to the model kind's family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<ClassifierFamily>,
    /// Held-out accuracy recorded at training time, 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Model parameters.
    pub model: ModelSpec,
}

/// The model artifact bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Ordered symptom vocabulary.
    pub symptoms: Vec<String>,
    /// Name of the primary model; the first model when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Models in registration order.
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl ModelArtifact {
    /// Read an artifact from disk. A missing file is [`CaduceusError::ArtifactMissing`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                CaduceusError::artifact_missing(format!("{} does not exist", path.display()))
            }
            _ => CaduceusError::artifact_missing(format!("cannot read {}: {e}", path.display())),
        })?;
        let artifact = Self::from_json(&content)?;
        info!(
            "Loaded model artifact {} ({} symptoms, {} models)",
            path.display(),
            artifact.symptoms.len(),
            artifact.models.len()
        );
        Ok(artifact)
    }

    /// Parse an artifact from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CaduceusError::artifact(format!("invalid model artifact: {e}")))
    }

    /// Write the artifact as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Build the vocabulary and the ordered registry.
    pub fn into_parts(self) -> Result<(SymptomVocabulary, ModelRegistry)> {
        let vocabulary = SymptomVocabulary::new(self.symptoms);
        if vocabulary.is_empty() {
            return Err(CaduceusError::artifact("artifact has an empty symptom list"));
        }

        let mut registry = ModelRegistry::new();
        for entry in self.models {
            let family = entry.family.unwrap_or_else(|| entry.model.default_family());
            let classifier = entry.model.into_classifier().map_err(|e| {
                CaduceusError::artifact(format!("model '{}': {e}", entry.name))
            })?;

            if let Some(n_features) = classifier.n_features()
                && n_features != vocabulary.len()
            {
                warn!(
                    "Model '{}' expects {n_features} features but the vocabulary has {}; it will be skipped at prediction time",
                    entry.name,
                    vocabulary.len()
                );
            }

            let mut model = RegisteredModel::new(entry.name, family, classifier);
            if let Some(accuracy) = entry.accuracy {
                model = model.with_accuracy(accuracy);
            }
            registry.register(model)?;
        }

        if let Some(primary) = self.primary {
            registry.set_primary(&primary)?;
        }

        Ok((vocabulary, registry))
    }
}
