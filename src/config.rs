//! Engine configuration.
//!
//! The configuration fixes everything the engine needs to start: where the
//! model artifact and reference tables live, which language the symptom
//! vocabulary is written in, the closed set of display locales, the
//! validation threshold and the per-family selection penalties.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CaduceusError, Result};
use crate::model::ClassifierFamily;

/// A display locale together with its precaution fallback text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Locale code used as the column suffix in the reference tables (e.g. `en`).
    pub code: String,
    /// Text used when a precaution row has no entry for this locale.
    pub precaution_fallback: String,
}

impl LocaleConfig {
    /// Create a new locale entry.
    pub fn new<S: Into<String>, T: Into<String>>(code: S, precaution_fallback: T) -> Self {
        LocaleConfig {
            code: code.into(),
            precaution_fallback: precaution_fallback.into(),
        }
    }
}

/// Selection penalties per classifier family.
///
/// The penalty is subtracted from a classifier's raw confidence when picking
/// the winner; it never changes the confidence shown in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Penalty for probabilistic ensembles (random forests and the like).
    pub probabilistic_ensemble: f64,
    /// Penalty for single tree models.
    pub tree_based: f64,
    /// Penalty for naive Bayes models.
    pub naive_bayes: f64,
    /// Penalty for every other family.
    pub other: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        PenaltyConfig {
            probabilistic_ensemble: 0.0,
            tree_based: 5.0,
            naive_bayes: 2.0,
            other: 0.0,
        }
    }
}

impl PenaltyConfig {
    /// Look up the penalty for a classifier family.
    pub fn penalty_for(&self, family: ClassifierFamily) -> f64 {
        match family {
            ClassifierFamily::ProbabilisticEnsemble => self.probabilistic_ensemble,
            ClassifierFamily::TreeBased => self.tree_based,
            ClassifierFamily::NaiveBayes => self.naive_bayes,
            ClassifierFamily::Other => self.other,
        }
    }

    fn values(&self) -> [(&'static str, f64); 4] {
        [
            ("probabilistic_ensemble", self.probabilistic_ensemble),
            ("tree_based", self.tree_based),
            ("naive_bayes", self.naive_bayes),
            ("other", self.other),
        ]
    }
}

/// Configuration for [`DiseasePredictionEngine`](crate::engine::DiseasePredictionEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the JSON model artifact.
    pub artifact_path: PathBuf,
    /// Directory holding the reference CSV tables.
    pub data_dir: PathBuf,
    /// Language the symptom vocabulary is written in.
    pub native_language: String,
    /// Ordered, closed set of display locales.
    pub locales: Vec<LocaleConfig>,
    /// Validation accepts a match when its score is strictly above this value.
    pub acceptance_threshold: u8,
    /// Selection penalties per classifier family.
    pub penalties: PenaltyConfig,
    /// Maximum number of precaution rows included in a result.
    pub max_precautions: usize,
    /// Severity reported when a disease has no severity row.
    pub default_severity: String,
    /// Upper bound for a single translation call, in milliseconds.
    pub translation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            artifact_path: PathBuf::from("model.json"),
            data_dir: PathBuf::from("data"),
            native_language: "en".to_string(),
            locales: vec![
                LocaleConfig::new("en", "Consult a doctor"),
                LocaleConfig::new("hi", "डॉक्टर से सलाह लें"),
                LocaleConfig::new("ta", "மருத்துவரை அணுகவும்"),
            ],
            acceptance_threshold: 70,
            penalties: PenaltyConfig::default(),
            max_precautions: 3,
            default_severity: "Medium".to_string(),
            translation_timeout_ms: 3000,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CaduceusError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the artifact path.
    pub fn with_artifact_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// Set the reference data directory.
    pub fn with_data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Replace the locale set.
    pub fn with_locales(mut self, locales: Vec<LocaleConfig>) -> Self {
        self.locales = locales;
        self
    }

    /// Locale codes in configured order.
    pub fn locale_codes(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.code.as_str()).collect()
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.native_language.trim().is_empty() {
            return Err(CaduceusError::config("native_language must not be empty"));
        }
        if self.locales.is_empty() {
            return Err(CaduceusError::config("at least one locale is required"));
        }

        let mut seen = HashSet::new();
        for locale in &self.locales {
            if locale.code.trim().is_empty() {
                return Err(CaduceusError::config("locale code must not be empty"));
            }
            if !seen.insert(locale.code.as_str()) {
                return Err(CaduceusError::config(format!(
                    "duplicate locale code '{}'",
                    locale.code
                )));
            }
        }

        if self.acceptance_threshold > 100 {
            return Err(CaduceusError::config(format!(
                "acceptance_threshold must be within 0..=100, got {}",
                self.acceptance_threshold
            )));
        }

        for (family, penalty) in self.penalties.values() {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(CaduceusError::config(format!(
                    "penalty for {family} must be a non-negative number, got {penalty}"
                )));
            }
        }

        Ok(())
    }
}
