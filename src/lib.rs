//! # Caduceus
//!
//! Multilingual symptom normalization and ensemble disease prediction.
//!
//! ## Features
//!
//! - Fuzzy, Unicode-aware matching of free text against a symptom vocabulary
//! - Optional translation with a bounded per-call timeout
//! - Ensemble scoring with per-family selection penalties
//! - Localized descriptions, severities and precautions from CSV tables
//!
//! ## Example
//!
//! ```no_run
//! use caduceus::prelude::*;
//!
//! let engine = DiseasePredictionEngine::open(EngineConfig::default())?;
//! match engine.predict(&["fever", "headache", "chills"]) {
//!     PredictOutcome::Predicted(result) => println!("{} ({:.1}%)", result.disease, result.confidence),
//!     PredictOutcome::Rejected { reason } => println!("{reason}"),
//! }
//! # Ok::<(), caduceus::error::CaduceusError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod outcome;
pub mod reference;
pub mod response;
pub mod scoring;
pub mod vocabulary;

pub mod prelude {
    pub use crate::config::{EngineConfig, LocaleConfig, PenaltyConfig};
    pub use crate::engine::{DiseasePredictionEngine, EngineInfo, Validation};
    pub use crate::error::{CaduceusError, Result};
    pub use crate::outcome::{PredictOutcome, Rejection};
    pub use crate::response::PredictionResult;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
