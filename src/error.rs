//! Error types for the Caduceus engine.
//!
//! Every fallible operation in the crate returns [`CaduceusError`]. Only
//! [`CaduceusError::ArtifactMissing`] and [`CaduceusError::Artifact`] are fatal:
//! they stop the engine from being constructed. Translation and inference
//! failures are produced by the pluggable capabilities and absorbed by the
//! normalizer and the ensemble scorer respectively.
//!
//! Request-level negative outcomes ("no usable input", "no prediction
//! available") are deliberately *not* errors; see
//! [`Rejection`](crate::outcome::Rejection).
//!
//! # Examples
//!
//! ```
//! use caduceus::error::{CaduceusError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(CaduceusError::config("locale set is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Caduceus operations.
#[derive(Error, Debug)]
pub enum CaduceusError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The model artifact could not be found. Fatal at startup.
    #[error("Model artifact missing: {0}")]
    ArtifactMissing(String),

    /// The model artifact exists but is malformed.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Reference table errors (descriptions, severities, precautions, aliases).
    #[error("Reference data error: {0}")]
    ReferenceData(String),

    /// A translation capability failed or timed out.
    #[error("Translation error: {0}")]
    Translation(String),

    /// A classifier failed to produce a prediction.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with CaduceusError.
pub type Result<T> = std::result::Result<T, CaduceusError>;

impl CaduceusError {
    /// Create a new artifact-missing error.
    pub fn artifact_missing<S: Into<String>>(msg: S) -> Self {
        CaduceusError::ArtifactMissing(msg.into())
    }

    /// Create a new malformed-artifact error.
    pub fn artifact<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Artifact(msg.into())
    }

    /// Create a new reference data error.
    pub fn reference_data<S: Into<String>>(msg: S) -> Self {
        CaduceusError::ReferenceData(msg.into())
    }

    /// Create a new translation error.
    pub fn translation<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Translation(msg.into())
    }

    /// Create a new inference error.
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Inference(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Other(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        CaduceusError::Translation(format!("Timeout: {}", msg.into()))
    }

    /// Whether this error must stop the engine from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CaduceusError::ArtifactMissing(_) | CaduceusError::Artifact(_)
        )
    }
}
