//! Command implementations for the caduceus CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::engine::DiseasePredictionEngine;
use crate::error::{CaduceusError, Result};
use crate::outcome::PredictOutcome;

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command produced its result.
    Success,
    /// The prediction request was rejected.
    Rejected,
}

/// Execute a CLI command.
pub fn execute_command(args: CaduceusArgs) -> Result<CommandStatus> {
    let engine = DiseasePredictionEngine::open(args.engine_config()?)?;

    match &args.command {
        Command::Validate(validate_args) => validate_symptom(&engine, validate_args, &args),
        Command::Predict(predict_args) => predict_disease(&engine, predict_args, &args),
        Command::PredictBatch(batch_args) => predict_batch(&engine, batch_args, &args),
        Command::Info => show_info(&engine, &args),
        Command::Symptoms => list_symptoms(&engine, &args),
    }
}

/// Match free text against the vocabulary.
fn validate_symptom(
    engine: &DiseasePredictionEngine,
    args: &ValidateArgs,
    cli_args: &CaduceusArgs,
) -> Result<CommandStatus> {
    let validation = engine.validate(&args.text, &args.lang);
    write_validation(&mut io::stdout().lock(), &validation, cli_args)?;
    Ok(CommandStatus::Success)
}

/// Predict a disease for one symptom set.
fn predict_disease(
    engine: &DiseasePredictionEngine,
    args: &PredictArgs,
    cli_args: &CaduceusArgs,
) -> Result<CommandStatus> {
    let outcome = engine.predict(&args.symptoms);
    write_outcome(&mut io::stdout().lock(), &outcome, cli_args)?;

    Ok(match outcome {
        PredictOutcome::Predicted(_) => CommandStatus::Success,
        PredictOutcome::Rejected { .. } => CommandStatus::Rejected,
    })
}

/// Predict diseases for every symptom set in a JSON Lines file.
fn predict_batch(
    engine: &DiseasePredictionEngine,
    args: &PredictBatchArgs,
    cli_args: &CaduceusArgs,
) -> Result<CommandStatus> {
    let requests = read_requests(&args.file)?;
    info!(
        "Predicting {} symptom sets from {}",
        requests.len(),
        args.file.display()
    );

    let outcomes = engine.predict_many(&requests);
    write_batch(&mut io::stdout().lock(), &outcomes, cli_args)?;
    Ok(CommandStatus::Success)
}

/// Show engine information.
fn show_info(engine: &DiseasePredictionEngine, cli_args: &CaduceusArgs) -> Result<CommandStatus> {
    write_info(&mut io::stdout().lock(), &engine.info(), cli_args)?;
    Ok(CommandStatus::Success)
}

/// List the symptom vocabulary.
fn list_symptoms(
    engine: &DiseasePredictionEngine,
    cli_args: &CaduceusArgs,
) -> Result<CommandStatus> {
    write_symptoms(&mut io::stdout().lock(), engine.symptoms(), cli_args)?;
    Ok(CommandStatus::Success)
}

/// Read one JSON array of symptoms per line. Blank lines are ignored.
pub fn read_requests<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut requests = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let symptoms: Vec<String> = serde_json::from_str(&line).map_err(|e| {
            CaduceusError::other(format!(
                "{} line {}: expected a JSON array of symptoms: {e}",
                path.display(),
                line_num + 1
            ))
        })?;
        requests.push(symptoms);
    }
    Ok(requests)
}
