//! Symptom vocabulary and binary feature vectorization.
//!
//! The vocabulary is the ordered list of canonical symptoms every classifier
//! was trained on. Its order fixes the length of the feature vector and the
//! position of each symptom inside it.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::outcome::Rejection;

/// Ordered, de-duplicated sequence of canonical symptom strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymptomVocabulary {
    symptoms: Vec<String>,
}

impl SymptomVocabulary {
    /// Build a vocabulary, dropping repeated entries while keeping first occurrences.
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = AHashSet::new();
        let symptoms = symptoms
            .into_iter()
            .map(Into::into)
            .filter(|symptom| seen.insert(symptom.clone()))
            .collect();
        SymptomVocabulary { symptoms }
    }

    /// Number of symptoms, which is also the feature vector length.
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    /// Check if the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Symptom at the given feature index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.symptoms.get(index).map(String::as_str)
    }

    /// All symptoms in feature order.
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Iterate over the symptoms in feature order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for SymptomVocabulary {
    fn from(symptoms: Vec<String>) -> Self {
        SymptomVocabulary::new(symptoms)
    }
}

impl From<SymptomVocabulary> for Vec<String> {
    fn from(vocabulary: SymptomVocabulary) -> Self {
        vocabulary.symptoms
    }
}

/// Fixed-length binary vector aligned to vocabulary indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    bits: Vec<u8>,
}

impl FeatureVector {
    /// Create an all-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        FeatureVector { bits: vec![0; len] }
    }

    /// Build a vector from explicit bits. Any non-zero value is stored as 1.
    pub fn from_bits<I: IntoIterator<Item = u8>>(bits: I) -> Self {
        FeatureVector {
            bits: bits.into_iter().map(|b| u8::from(b != 0)).collect(),
        }
    }

    /// Set the bit at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = 1;
        }
    }

    /// Whether the bit at `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|&b| b == 1)
    }

    /// Vector length.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Check if the vector has zero length.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b == 1).count()
    }

    /// Raw bits.
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    /// Bits as floating point values, for linear models.
    pub fn iter_f64(&self) -> impl Iterator<Item = f64> + '_ {
        self.bits.iter().map(|&b| f64::from(b))
    }
}

/// Vectorized symptom set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vectorized {
    /// The binary feature vector.
    pub vector: FeatureVector,
    /// Canonical symptoms that set a bit, in first-occurrence order.
    pub matched: Vec<String>,
}

/// Converts symptom strings into the feature vector the classifiers expect.
#[derive(Debug, Clone)]
pub struct FeatureVectorizer {
    vocabulary: Arc<SymptomVocabulary>,
    /// Trimmed, lowercased symptom -> feature index.
    index: AHashMap<String, usize>,
}

impl FeatureVectorizer {
    /// Create a vectorizer. The lookup table is built once here.
    pub fn new(vocabulary: Arc<SymptomVocabulary>) -> Self {
        let mut index = AHashMap::with_capacity(vocabulary.len());
        for (i, symptom) in vocabulary.iter().enumerate() {
            // First entry wins when two symptoms differ only by case or padding.
            index.entry(Self::lookup_key(symptom)).or_insert(i);
        }
        FeatureVectorizer { vocabulary, index }
    }

    /// The vocabulary this vectorizer is aligned to.
    pub fn vocabulary(&self) -> &Arc<SymptomVocabulary> {
        &self.vocabulary
    }

    /// Feature index of a symptom, ignoring case and surrounding whitespace.
    pub fn index_of(&self, symptom: &str) -> Option<usize> {
        self.index.get(&Self::lookup_key(symptom)).copied()
    }

    /// Vectorize a symptom set.
    ///
    /// Unknown symptoms are dropped with a warning. If nothing matched the
    /// request is rejected with [`Rejection::NoUsableInput`], since an all-zero
    /// vector would look like a valid input to the classifiers.
    pub fn vectorize<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Vectorized, Rejection> {
        let mut vector = FeatureVector::zeros(self.vocabulary.len());
        let mut matched = Vec::new();

        for symptom in symptoms {
            let symptom = symptom.as_ref();
            match self.index_of(symptom) {
                Some(idx) => {
                    if !vector.is_set(idx) {
                        vector.set(idx);
                        if let Some(canonical) = self.vocabulary.get(idx) {
                            matched.push(canonical.to_string());
                        }
                    }
                }
                None => warn!("Symptom '{symptom}' is not part of the vocabulary, skipping"),
            }
        }

        if matched.is_empty() {
            return Err(Rejection::NoUsableInput);
        }

        Ok(Vectorized { vector, matched })
    }

    fn lookup_key(symptom: &str) -> String {
        symptom.trim().to_lowercase()
    }
}
