//! Multilingual symptom normalization.
//!
//! This module turns free text typed by a user into the closest canonical
//! symptom of the vocabulary: optional translation into the vocabulary's
//! language, Unicode-aware preprocessing, and token-based fuzzy scoring.

pub mod fuzz;
pub mod levenshtein;
pub mod normalizer;
pub mod translate;

pub use normalizer::{SymptomMatch, SymptomNormalizer};
pub use translate::{AliasTranslator, BoundedTranslator, NoopTranslator, Translator};
