//! Ensemble scoring and winner selection.
//!
//! Every registered classifier is evaluated in registration order. The
//! winner is chosen by *selection score* (raw confidence minus the family
//! penalty), while the comparison returned to callers is ordered by *raw*
//! confidence, so the penalty policy never edits what users are shown.

use std::cmp::Ordering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::PenaltyConfig;
use crate::error::{CaduceusError, Result};
use crate::model::classifier::argmax;
use crate::model::{Classifier, ModelRegistry};
use crate::outcome::Rejection;
use crate::vocabulary::FeatureVector;

/// A candidate must score strictly above this to be selected.
const MIN_SELECTION_SCORE: f64 = -1.0;

/// One classifier's opinion about a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCandidate {
    /// Registered model name.
    pub model: String,
    /// Predicted disease label.
    pub disease: String,
    /// Raw self-reported confidence, 0..=100.
    pub confidence: f64,
}

/// Result of running a vector through the whole registry.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleScore {
    /// The selected candidate.
    pub winner: PredictionCandidate,
    /// Confidence minus penalty of the winner.
    pub selection_score: f64,
    /// Every successfully scored candidate, by raw confidence descending.
    pub comparison: Vec<PredictionCandidate>,
}

/// Runs the registry and applies the penalty-adjusted selection policy.
#[derive(Debug, Clone, Default)]
pub struct EnsembleScorer {
    penalties: PenaltyConfig,
}

impl EnsembleScorer {
    /// Create a scorer with the given penalty table.
    pub fn new(penalties: PenaltyConfig) -> Self {
        EnsembleScorer { penalties }
    }

    /// The penalty table in use.
    pub fn penalties(&self) -> &PenaltyConfig {
        &self.penalties
    }

    /// Score `vector` with every registered classifier.
    ///
    /// Classifiers that fail are skipped. The first classifier reaching the
    /// highest selection score wins; later classifiers must be strictly better
    /// to replace it. Blank labels and selection scores at or below -1 are
    /// listed in the comparison but never selected. Fails with
    /// [`Rejection::NoPredictionAvailable`] when no candidate is selectable.
    pub fn score(
        &self,
        vector: &FeatureVector,
        registry: &ModelRegistry,
    ) -> std::result::Result<EnsembleScore, Rejection> {
        let mut comparison = Vec::with_capacity(registry.len());
        let mut best: Option<(usize, f64)> = None;

        for model in registry.iter() {
            let (disease, confidence) = match predict_with_confidence(model.classifier(), vector) {
                Ok(prediction) => prediction,
                Err(e) => {
                    warn!("Error predicting with {}: {e}", model.name());
                    continue;
                }
            };

            let selection_score = confidence - self.penalties.penalty_for(model.family());
            debug!(
                "{} ({}) predicted '{disease}' with confidence {confidence:.2}, selection score {selection_score:.2}",
                model.name(),
                model.family()
            );

            let best_score = best.map_or(MIN_SELECTION_SCORE, |(_, score)| score);
            if !disease.trim().is_empty() && selection_score > best_score {
                best = Some((comparison.len(), selection_score));
            }
            comparison.push(PredictionCandidate {
                model: model.name().to_string(),
                disease,
                confidence,
            });
        }

        let Some((winner_idx, selection_score)) = best else {
            return Err(Rejection::NoPredictionAvailable);
        };
        let winner = comparison[winner_idx].clone();
        debug!(
            "Selected {} ('{}') with selection score {selection_score:.2}",
            winner.model, winner.disease
        );

        // Stable sort keeps registration order among equal confidences.
        comparison.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        Ok(EnsembleScore {
            winner,
            selection_score,
            comparison,
        })
    }
}

/// Predict a label and its raw confidence in 0..=100.
///
/// Probabilistic classifiers report 100 times their top probability.
/// Deterministic classifiers report 100 for an affirmative (non-blank) label
/// and 0 otherwise.
pub fn predict_with_confidence(
    classifier: &Classifier,
    vector: &FeatureVector,
) -> Result<(String, f64)> {
    match classifier {
        Classifier::Probabilistic(model) => {
            let proba = model.predict_proba(vector)?;
            let idx = argmax(&proba).ok_or_else(|| {
                CaduceusError::inference(format!(
                    "{} returned no usable probabilities",
                    model.display_name()
                ))
            })?;
            let label = model.classes().get(idx).cloned().ok_or_else(|| {
                CaduceusError::inference(format!(
                    "{} has no class for probability {idx}",
                    model.display_name()
                ))
            })?;
            Ok((label, (proba[idx] * 100.0).clamp(0.0, 100.0)))
        }
        Classifier::Deterministic(model) => {
            let label = model.predict(vector)?;
            let confidence = if label.trim().is_empty() { 0.0 } else { 100.0 };
            Ok((label, confidence))
        }
    }
}
