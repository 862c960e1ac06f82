//! Request-level outcomes.
//!
//! A prediction request either produces a [`PredictionResult`] or is rejected
//! for one of two reasons. Rejections are ordinary values, not errors, so a
//! "cannot determine a result" outcome is never mistaken for a genuine
//! low-confidence prediction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::PredictionResult;

/// Why a request could not produce a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// None of the provided symptoms is part of the vocabulary.
    NoUsableInput,
    /// Every classifier failed, or no classifier is registered.
    NoPredictionAvailable,
}

impl Rejection {
    /// User-facing explanation of the rejection.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::NoUsableInput => "None of the provided symptoms could be recognized",
            Rejection::NoPredictionAvailable => {
                "Could not make a prediction based on provided symptoms"
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a single prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictOutcome {
    /// A disease hypothesis was produced.
    Predicted(PredictionResult),
    /// The request was rejected; see [`Rejection`].
    Rejected { reason: Rejection },
}

impl PredictOutcome {
    /// The prediction, if one was produced.
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictOutcome::Predicted(result) => Some(result),
            PredictOutcome::Rejected { .. } => None,
        }
    }

    /// The rejection reason, if the request was rejected.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            PredictOutcome::Predicted(_) => None,
            PredictOutcome::Rejected { reason } => Some(*reason),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<PredictionResult, Rejection> {
        match self {
            PredictOutcome::Predicted(result) => Ok(result),
            PredictOutcome::Rejected { reason } => Err(reason),
        }
    }
}

impl From<Rejection> for PredictOutcome {
    fn from(reason: Rejection) -> Self {
        PredictOutcome::Rejected { reason }
    }
}

impl From<Result<PredictionResult, Rejection>> for PredictOutcome {
    fn from(result: Result<PredictionResult, Rejection>) -> Self {
        match result {
            Ok(result) => PredictOutcome::Predicted(result),
            Err(reason) => PredictOutcome::Rejected { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_outcome() {
        let outcome = PredictOutcome::from(Rejection::NoUsableInput);
        assert!(outcome.result().is_none());
        assert_eq!(outcome.rejection(), Some(Rejection::NoUsableInput));
        assert_eq!(outcome.into_result(), Err(Rejection::NoUsableInput));
    }

    #[test]
    fn test_rejection_serialization() {
        let outcome = PredictOutcome::from(Rejection::NoPredictionAvailable);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "no_prediction_available");
    }
}
