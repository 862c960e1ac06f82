//! The disease prediction engine.
//!
//! [`DiseasePredictionEngine`] wires the normalizer, the vectorizer, the
//! ensemble scorer and the response assembler together. It is built once at
//! startup and is immutable afterwards, so a single instance can be shared by
//! reference (or behind an `Arc`) between any number of request threads.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{CaduceusError, Result};
use crate::model::{ModelArtifact, ModelRegistry};
use crate::normalize::{
    AliasTranslator, BoundedTranslator, NoopTranslator, SymptomMatch, SymptomNormalizer,
    Translator,
};
use crate::outcome::{PredictOutcome, Rejection};
use crate::reference::{ALIAS_FILE, ReferenceTables};
use crate::response::{PredictionResult, ResponseAssembler};
use crate::scoring::EnsembleScorer;
use crate::vocabulary::{FeatureVectorizer, SymptomVocabulary};

/// Result of the validate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Best matching canonical symptom, reported even when not accepted.
    #[serde(rename = "match")]
    pub symptom: Option<String>,
    /// Similarity of the best match, 0..=100.
    pub score: u8,
    /// Whether the score is above the acceptance threshold.
    pub valid: bool,
}

/// Read-only summary of the loaded engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    /// Display name of the primary classifier.
    pub model: String,
    /// Recorded accuracy of the primary classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Number of diseases with a description.
    pub diseases: usize,
    /// Number of canonical symptoms.
    pub symptoms: usize,
    /// Always `"active"` once the engine is constructed.
    pub status: String,
    /// UTC time at which this summary was computed.
    pub timestamp: DateTime<Utc>,
}

/// Symptom normalization and ensemble disease prediction over a loaded model artifact.
#[derive(Debug)]
pub struct DiseasePredictionEngine {
    config: EngineConfig,
    vocabulary: Arc<SymptomVocabulary>,
    normalizer: SymptomNormalizer,
    vectorizer: FeatureVectorizer,
    registry: ModelRegistry,
    scorer: EnsembleScorer,
    assembler: ResponseAssembler,
}

impl DiseasePredictionEngine {
    /// Load the artifact and reference data named by `config`.
    ///
    /// A missing or malformed artifact is fatal. Reference tables and the
    /// alias table are optional and degrade to defaults.
    pub fn open(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let artifact = ModelArtifact::load(&config.artifact_path)?;
        let (vocabulary, registry) = artifact.into_parts()?;

        let locales = config.locale_codes();
        let tables = ReferenceTables::load(&config.data_dir, &locales);

        let alias_path = config.data_dir.join(ALIAS_FILE);
        let translator: Arc<dyn Translator> = if alias_path.exists() {
            match AliasTranslator::from_csv(&alias_path, config.native_language.clone()) {
                Ok(aliases) => Arc::new(aliases),
                Err(e) => {
                    warn!("Symptom aliases unavailable, translation disabled: {e}");
                    Arc::new(NoopTranslator)
                }
            }
        } else {
            debug!("No alias table at {}, translation disabled", alias_path.display());
            Arc::new(NoopTranslator)
        };

        let engine = Self::from_parts(config, vocabulary, registry, tables, translator)?;
        info!(
            "Engine ready: {} symptoms, {} models, {} described diseases",
            engine.vocabulary.len(),
            engine.registry.len(),
            engine.assembler.tables().described_diseases()
        );
        Ok(engine)
    }

    /// Assemble an engine from already loaded parts.
    ///
    /// `translator` is wrapped so a single call never exceeds
    /// `config.translation_timeout_ms`.
    pub fn from_parts(
        config: EngineConfig,
        vocabulary: SymptomVocabulary,
        registry: ModelRegistry,
        tables: ReferenceTables,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        config.validate()?;
        if vocabulary.is_empty() {
            return Err(CaduceusError::config("symptom vocabulary must not be empty"));
        }

        let vocabulary = Arc::new(vocabulary);
        let bounded = BoundedTranslator::new(
            translator,
            Duration::from_millis(config.translation_timeout_ms),
        );
        let normalizer =
            SymptomNormalizer::new(Arc::clone(&vocabulary), config.native_language.clone())
                .with_translator(Arc::new(bounded));
        let vectorizer = FeatureVectorizer::new(Arc::clone(&vocabulary));
        let scorer = EnsembleScorer::new(config.penalties.clone());
        let assembler = ResponseAssembler::from_config(Arc::new(tables), &config);

        Ok(DiseasePredictionEngine {
            config,
            vocabulary,
            normalizer,
            vectorizer,
            registry,
            scorer,
            assembler,
        })
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The ordered model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Closest canonical symptom for free text, without any threshold.
    pub fn normalize(&self, text: &str, language: &str) -> SymptomMatch {
        self.normalizer.normalize(text, language)
    }

    /// Normalize `text` and apply the acceptance threshold.
    pub fn validate(&self, text: &str, language: &str) -> Validation {
        let SymptomMatch { symptom, score } = self.normalize(text, language);
        Validation {
            valid: symptom.is_some() && score > self.config.acceptance_threshold,
            symptom,
            score,
        }
    }

    /// Predict a disease from canonical symptoms.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> PredictOutcome {
        self.try_predict(symptoms).into()
    }

    /// Predict many independent symptom sets in parallel. Outcomes keep input order.
    pub fn predict_many<S: AsRef<str> + Sync>(&self, requests: &[Vec<S>]) -> Vec<PredictOutcome> {
        requests
            .par_iter()
            .map(|symptoms| self.predict(symptoms))
            .collect()
    }

    /// Summary of the loaded engine, computed on demand.
    pub fn info(&self) -> EngineInfo {
        let primary = self.registry.primary();
        EngineInfo {
            model: primary
                .map(|m| m.classifier().display_name().to_string())
                .unwrap_or_else(|| "none".to_string()),
            accuracy: primary.and_then(|m| m.accuracy()),
            diseases: self.assembler.tables().described_diseases(),
            symptoms: self.vocabulary.len(),
            status: "active".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// The canonical symptoms in vocabulary order.
    pub fn symptoms(&self) -> &[String] {
        self.vocabulary.symptoms()
    }

    fn try_predict<S: AsRef<str>>(
        &self,
        symptoms: &[S],
    ) -> std::result::Result<PredictionResult, Rejection> {
        let vectorized = self.vectorizer.vectorize(symptoms)?;
        let score = self.scorer.score(&vectorized.vector, &self.registry)?;
        Ok(self
            .assembler
            .assemble(&score.winner, vectorized.matched, score.comparison))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Classifier, ClassifierFamily, DeterministicClassifier, MultinomialNaiveBayes,
        RegisteredModel,
    };
    use crate::vocabulary::FeatureVector;

    fn engine() -> DiseasePredictionEngine {
        let vocabulary = SymptomVocabulary::new(["fever", "headache", "cough", "sneezing"]);
        let samples = vec![
            (FeatureVector::from_bits([1, 1, 0, 0]), "Viral Fever".to_string()),
            (FeatureVector::from_bits([1, 0, 0, 0]), "Viral Fever".to_string()),
            (FeatureVector::from_bits([0, 0, 1, 1]), "Common Cold".to_string()),
            (FeatureVector::from_bits([0, 0, 0, 1]), "Common Cold".to_string()),
        ];
        let nb = MultinomialNaiveBayes::fit(&samples, 1.0).unwrap();
        let registry = ModelRegistry::new()
            .with_model(
                RegisteredModel::new(
                    "Naive Bayes",
                    ClassifierFamily::NaiveBayes,
                    Classifier::probabilistic(nb),
                )
                .with_accuracy(0.9),
            )
            .unwrap();

        DiseasePredictionEngine::from_parts(
            EngineConfig::default(),
            vocabulary,
            registry,
            ReferenceTables::new(),
            Arc::new(NoopTranslator),
        )
        .unwrap()
    }

    /// Deterministic model that never predicts a disease.
    #[derive(Debug)]
    struct NegativeTree;

    impl DeterministicClassifier for NegativeTree {
        fn predict(&self, _features: &FeatureVector) -> Result<String> {
            Ok(String::new())
        }

        fn display_name(&self) -> &str {
            "Decision Tree"
        }
    }

    #[test]
    fn test_negative_prediction_is_not_a_result() {
        let registry = ModelRegistry::new()
            .with_model(RegisteredModel::new(
                "Tree",
                ClassifierFamily::TreeBased,
                Classifier::deterministic(NegativeTree),
            ))
            .unwrap();
        let engine = DiseasePredictionEngine::from_parts(
            EngineConfig::default(),
            SymptomVocabulary::new(["fever", "cough"]),
            registry,
            ReferenceTables::new(),
            Arc::new(NoopTranslator),
        )
        .unwrap();

        assert_eq!(
            engine.predict(&["fever"]),
            PredictOutcome::Rejected {
                reason: Rejection::NoPredictionAvailable
            }
        );
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiseasePredictionEngine>();
    }

    #[test]
    fn test_predict() {
        let outcome = engine().predict(&["fever", "headache"]);
        let result = outcome.result().unwrap();
        assert_eq!(result.disease, "Viral Fever");
        assert_eq!(result.model_used, "Naive Bayes");
        assert_eq!(result.severity, "Medium");
        assert!((0.0..=100.0).contains(&result.confidence));
    }

    #[test]
    fn test_predict_rejects_unknown_symptoms() {
        let outcome = engine().predict(&["dizziness"]);
        assert_eq!(outcome.rejection(), Some(Rejection::NoUsableInput));
    }

    #[test]
    fn test_validate_applies_threshold() {
        let engine = engine();
        let validation = engine.validate("fever", "en");
        assert_eq!(validation.symptom.as_deref(), Some("fever"));
        assert_eq!(validation.score, 100);
        assert!(validation.valid);

        let validation = engine.validate("qqqq", "en");
        assert!(validation.symptom.is_some());
        assert!(!validation.valid);
    }

    #[test]
    fn test_info() {
        let info = engine().info();
        assert_eq!(info.model, "Naive Bayes");
        assert_eq!(info.accuracy, Some(0.9));
        assert_eq!(info.symptoms, 4);
        assert_eq!(info.diseases, 0);
        assert_eq!(info.status, "active");
    }

    #[test]
    fn test_predict_many_keeps_order() {
        let requests = vec![
            vec!["sneezing", "cough"],
            vec![],
            vec!["fever", "headache"],
        ];
        let outcomes = engine().predict_many(&requests);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].result().unwrap().disease, "Common Cold");
        assert_eq!(outcomes[1].rejection(), Some(Rejection::NoUsableInput));
        assert_eq!(outcomes[2].result().unwrap().disease, "Viral Fever");
    }
}
