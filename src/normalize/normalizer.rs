//! Free-text to canonical symptom normalization.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::normalize::fuzz::{preprocess, weighted_ratio};
use crate::normalize::translate::{NoopTranslator, Translator};
use crate::vocabulary::SymptomVocabulary;

/// Closest vocabulary entry for a piece of free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomMatch {
    /// Best matching canonical symptom, `None` when nothing could be compared.
    #[serde(rename = "match")]
    pub symptom: Option<String>,
    /// Similarity of the best match, 0..=100.
    pub score: u8,
}

impl SymptomMatch {
    fn none() -> Self {
        SymptomMatch {
            symptom: None,
            score: 0,
        }
    }
}

/// Maps free text in any supported language to the closest canonical symptom.
///
/// The normalizer never applies an acceptance threshold: it always returns
/// its best guess and leaves the accept/suggest decision to the caller.
#[derive(Debug, Clone)]
pub struct SymptomNormalizer {
    vocabulary: Arc<SymptomVocabulary>,
    /// Preprocessed vocabulary entries, aligned with `vocabulary`.
    processed: Vec<String>,
    native_language: String,
    translator: Arc<dyn Translator>,
}

impl SymptomNormalizer {
    /// Create a normalizer without translation support.
    pub fn new<S: Into<String>>(vocabulary: Arc<SymptomVocabulary>, native_language: S) -> Self {
        let processed = vocabulary.iter().map(preprocess).collect();
        SymptomNormalizer {
            vocabulary,
            processed,
            native_language: native_language.into(),
            translator: Arc::new(NoopTranslator),
        }
    }

    /// Use `translator` for text in non-native languages.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Language the vocabulary is written in.
    pub fn native_language(&self) -> &str {
        &self.native_language
    }

    /// Find the vocabulary entry closest to `text`.
    ///
    /// Text in a language other than the native one is translated first; if
    /// translation fails the original text is matched as is. Ties go to the
    /// earliest vocabulary entry.
    pub fn normalize(&self, text: &str, language: &str) -> SymptomMatch {
        if text.trim().is_empty() {
            return SymptomMatch::none();
        }

        let text = if language == self.native_language {
            text.to_string()
        } else {
            match self.translator.translate(text, language, &self.native_language) {
                Ok(translated) => {
                    debug!("Translated '{text}' ({language}) to '{translated}'");
                    translated
                }
                Err(e) => {
                    warn!(
                        "Translation of '{text}' from '{language}' via {} failed, matching untranslated: {e}",
                        self.translator.name()
                    );
                    text.to_string()
                }
            }
        };

        let query = preprocess(&text);
        let mut best: Option<(usize, u8)> = None;
        for (idx, candidate) in self.processed.iter().enumerate() {
            let score = weighted_ratio(&query, candidate);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) => SymptomMatch {
                symptom: self.vocabulary.get(idx).map(str::to_string),
                score,
            },
            None => SymptomMatch::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::translate::AliasTranslator;

    fn normalizer() -> SymptomNormalizer {
        let vocabulary = SymptomVocabulary::new([
            "chills",
            "fever",
            "headache",
            "skin rash",
            "chest pain",
        ]);
        SymptomNormalizer::new(Arc::new(vocabulary), "en")
    }

    #[test]
    fn test_exact_match() {
        let m = normalizer().normalize("fever", "en");
        assert_eq!(m.symptom.as_deref(), Some("fever"));
        assert_eq!(m.score, 100);
    }

    #[test]
    fn test_fuzzy_match_returns_best_guess() {
        let m = normalizer().normalize("I have a bad headahce", "en");
        assert_eq!(m.symptom.as_deref(), Some("headache"));
        assert!(m.score > 0);

        let m = normalizer().normalize("pain in my chest", "en");
        assert_eq!(m.symptom.as_deref(), Some("chest pain"));
    }

    #[test]
    fn test_weak_match_is_still_returned() {
        let m = normalizer().normalize("zzzz", "en");
        assert!(m.symptom.is_some());
        assert!(m.score < 70);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(normalizer().normalize("   ", "en"), SymptomMatch::none());
    }

    #[test]
    fn test_translation_is_used_for_other_languages() {
        let translator = AliasTranslator::new("en").with_alias("hi", "बुखार", "fever");
        let normalizer = normalizer().with_translator(Arc::new(translator));
        let m = normalizer.normalize("बुखार", "hi");
        assert_eq!(m.symptom.as_deref(), Some("fever"));
        assert_eq!(m.score, 100);
    }

    #[test]
    fn test_alias_in_another_language_is_not_used() {
        let translator = AliasTranslator::new("en").with_alias("ta", "kaichal", "fever");
        let normalizer = normalizer().with_translator(Arc::new(translator));
        assert_eq!(normalizer.normalize("kaichal", "ta").symptom.as_deref(), Some("fever"));
        assert_ne!(normalizer.normalize("kaichal", "hi").score, 100);
    }

    #[test]
    fn test_translation_failure_falls_back_to_original_text() {
        // The default translator always fails; the text is matched untranslated.
        let m = normalizer().normalize("fever", "hi");
        assert_eq!(m.symptom.as_deref(), Some("fever"));
        assert_eq!(m.score, 100);
    }
}
