//! Command line argument parsing for the caduceus CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;

/// Caduceus - multilingual symptom normalization and disease prediction
#[derive(Parser, Debug, Clone)]
#[command(name = "caduceus")]
#[command(about = "Symptom normalization and ensemble disease prediction")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct CaduceusArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "CADUCEUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model artifact path, overrides the configuration
    #[arg(long, value_name = "ARTIFACT")]
    pub artifact: Option<PathBuf>,

    /// Reference data directory, overrides the configuration
    #[arg(long, value_name = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl CaduceusArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }

    /// Build the engine configuration from `--config` and the path overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(artifact) = &self.artifact {
            config = config.with_artifact_path(artifact);
        }
        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir);
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Match free text against the symptom vocabulary
    Validate(ValidateArgs),

    /// Predict a disease from canonical symptoms
    Predict(PredictArgs),

    /// Predict diseases for every line of a JSON Lines file
    #[command(name = "predict-batch")]
    PredictBatch(PredictBatchArgs),

    /// Show engine information
    Info,

    /// List the symptom vocabulary
    Symptoms,
}

/// Arguments for symptom validation
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Free text describing one symptom
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Language of the text
    #[arg(short, long, default_value = "en")]
    pub lang: String,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Canonical symptoms
    #[arg(value_name = "SYMPTOM", required = true)]
    pub symptoms: Vec<String>,
}

/// Arguments for batch prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictBatchArgs {
    /// JSON Lines file, one array of symptoms per line
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
