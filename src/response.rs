//! Final result assembly.
//!
//! The assembler enriches the winning disease label with reference data and
//! packages everything a caller needs. It performs no I/O: the reference
//! tables are loaded beforehand and only read here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, LocaleConfig};
use crate::reference::ReferenceTables;
use crate::scoring::PredictionCandidate;

/// Text keyed by locale code.
pub type Localized = BTreeMap<String, String>;

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted disease label.
    pub disease: String,
    /// Raw confidence of the winning classifier, 0..=100.
    pub confidence: f64,
    /// Severity tier of the disease.
    pub severity: String,
    /// Description per configured locale; empty when unknown.
    pub description: Localized,
    /// At most `max_precautions` precaution rows, one entry per configured locale.
    pub precautions: Vec<Localized>,
    /// Canonical symptoms that were recognized in the request.
    pub matched_symptoms: Vec<String>,
    /// Every classifier's opinion, by raw confidence descending.
    pub comparison: Vec<PredictionCandidate>,
    /// Registered name of the winning classifier.
    pub model_used: String,
}

/// Builds [`PredictionResult`]s from a winner and the reference tables.
#[derive(Debug, Clone)]
pub struct ResponseAssembler {
    tables: Arc<ReferenceTables>,
    locales: Vec<LocaleConfig>,
    max_precautions: usize,
    default_severity: String,
}

impl ResponseAssembler {
    pub fn new(
        tables: Arc<ReferenceTables>,
        locales: Vec<LocaleConfig>,
        max_precautions: usize,
        default_severity: impl Into<String>,
    ) -> Self {
        ResponseAssembler {
            tables,
            locales,
            max_precautions,
            default_severity: default_severity.into(),
        }
    }

    /// Create an assembler using the locale and precaution settings of `config`.
    pub fn from_config(tables: Arc<ReferenceTables>, config: &EngineConfig) -> Self {
        Self::new(
            tables,
            config.locales.clone(),
            config.max_precautions,
            config.default_severity.clone(),
        )
    }

    /// The reference tables in use.
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Package `winner` into a result.
    ///
    /// Unknown diseases are not an error: descriptions are empty, the severity
    /// is the default tier and there are no precautions.
    pub fn assemble(
        &self,
        winner: &PredictionCandidate,
        matched_symptoms: Vec<String>,
        comparison: Vec<PredictionCandidate>,
    ) -> PredictionResult {
        let record = self.tables.get(&winner.disease);

        let description = self
            .locales
            .iter()
            .map(|locale| {
                let text = record
                    .and_then(|r| r.description.as_ref())
                    .and_then(|d| d.get(&locale.code))
                    .cloned()
                    .unwrap_or_default();
                (locale.code.clone(), text)
            })
            .collect();

        let severity = record
            .and_then(|r| r.severity.clone())
            .unwrap_or_else(|| self.default_severity.clone());

        let precautions = record
            .map(|r| {
                r.precautions
                    .iter()
                    .take(self.max_precautions)
                    .map(|row| {
                        self.locales
                            .iter()
                            .map(|locale| {
                                let text = row
                                    .get(&locale.code)
                                    .cloned()
                                    .unwrap_or_else(|| locale.precaution_fallback.clone());
                                (locale.code.clone(), text)
                            })
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        PredictionResult {
            disease: winner.disease.clone(),
            confidence: winner.confidence,
            severity,
            description,
            precautions,
            matched_symptoms,
            comparison,
            model_used: winner.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn candidate(disease: &str) -> PredictionCandidate {
        PredictionCandidate {
            model: "Naive Bayes".to_string(),
            disease: disease.to_string(),
            confidence: 87.5,
        }
    }

    fn assembler(tables: ReferenceTables) -> ResponseAssembler {
        ResponseAssembler::from_config(Arc::new(tables), &EngineConfig::default())
    }

    #[test]
    fn test_assemble_known_disease() {
        let mut tables = ReferenceTables::new();
        tables.insert_description(
            "Malaria",
            row(&[("en", "Mosquito-borne disease"), ("hi", "मच्छर जनित रोग")]),
        );
        tables.insert_severity("Malaria", "High");
        for text in ["Use nets", "Take medication", "Keep surroundings clean", "Extra"] {
            tables.push_precaution("Malaria", row(&[("en", text)]));
        }

        let winner = candidate("Malaria");
        let result = assembler(tables).assemble(
            &winner,
            vec!["fever".to_string()],
            vec![winner.clone()],
        );

        assert_eq!(result.disease, "Malaria");
        assert_eq!(result.model_used, "Naive Bayes");
        assert_eq!(result.severity, "High");
        assert_eq!(result.description["en"], "Mosquito-borne disease");
        assert_eq!(result.description["ta"], "");
        assert_eq!(result.precautions.len(), 3);
        assert_eq!(result.precautions[0]["en"], "Use nets");
        assert_eq!(result.precautions[0]["hi"], "डॉक्टर से सलाह लें");
        assert_eq!(result.precautions[2]["en"], "Keep surroundings clean");
    }

    #[test]
    fn test_unknown_disease_gets_defaults() {
        let result = assembler(ReferenceTables::new()).assemble(
            &candidate("Unlisted Disease"),
            vec!["cough".to_string()],
            Vec::new(),
        );

        assert_eq!(result.description.len(), 3);
        assert!(result.description.values().all(String::is_empty));
        assert_eq!(result.severity, "Medium");
        assert!(result.precautions.is_empty());
        assert_eq!(result.matched_symptoms, vec!["cough"]);
    }

    #[test]
    fn test_locales_follow_configuration() {
        let mut tables = ReferenceTables::new();
        tables.push_precaution("Flu", row(&[("es", "Descanse")]));

        let locales = vec![
            LocaleConfig::new("en", "Consult a doctor"),
            LocaleConfig::new("es", "Consulte a un médico"),
        ];
        let assembler = ResponseAssembler::new(Arc::new(tables), locales, 3, "Low");
        let result = assembler.assemble(&candidate("Flu"), Vec::new(), Vec::new());

        assert_eq!(result.severity, "Low");
        assert_eq!(result.precautions.len(), 1);
        assert_eq!(result.precautions[0]["en"], "Consult a doctor");
        assert_eq!(result.precautions[0]["es"], "Descanse");
        assert!(!result.precautions[0].contains_key("hi"));
    }
}
