//! Output formatting for CLI commands.

use std::io::Write;

use serde::Serialize;

use crate::cli::args::{CaduceusArgs, OutputFormat};
use crate::engine::{EngineInfo, Validation};
use crate::error::Result;
use crate::outcome::{PredictOutcome, Rejection};
use crate::response::{Localized, PredictionResult};

/// JSON body printed for a rejected request.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Write `value` as JSON, pretty-printed when `--pretty` is set.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
    args: &CaduceusArgs,
) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

/// Write the result of a validate command.
pub fn write_validation<W: Write>(
    out: &mut W,
    validation: &Validation,
    args: &CaduceusArgs,
) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return write_json(out, validation, args);
    }

    match &validation.symptom {
        Some(symptom) if validation.valid => {
            writeln!(out, "Recognized: {symptom} (score {})", validation.score)?;
        }
        Some(symptom) => {
            writeln!(
                out,
                "Not recognized. Did you mean: {symptom}? (score {})",
                validation.score
            )?;
        }
        None => writeln!(out, "Not recognized.")?,
    }
    Ok(())
}

/// Write the outcome of a predict command.
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &PredictOutcome,
    args: &CaduceusArgs,
) -> Result<()> {
    match (outcome, args.output_format) {
        (PredictOutcome::Predicted(result), OutputFormat::Json) => write_json(out, result, args),
        (PredictOutcome::Predicted(result), OutputFormat::Human) => {
            write_prediction_human(out, result, args)
        }
        (PredictOutcome::Rejected { reason }, OutputFormat::Json) => write_json(
            out,
            &ErrorBody {
                error: reason.message(),
            },
            args,
        ),
        (PredictOutcome::Rejected { reason }, OutputFormat::Human) => {
            write_rejection_human(out, *reason)
        }
    }
}

/// Write the outcomes of a predict-batch command.
pub fn write_batch<W: Write>(
    out: &mut W,
    outcomes: &[PredictOutcome],
    args: &CaduceusArgs,
) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return write_json(out, outcomes, args);
    }

    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            PredictOutcome::Predicted(result) => writeln!(
                out,
                "{:>4}  {} ({:.2}%, {})",
                i + 1,
                result.disease,
                result.confidence,
                result.model_used
            )?,
            PredictOutcome::Rejected { reason } => writeln!(out, "{:>4}  {reason}", i + 1)?,
        }
    }
    Ok(())
}

/// Write the result of an info command.
pub fn write_info<W: Write>(out: &mut W, info: &EngineInfo, args: &CaduceusArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return write_json(out, info, args);
    }

    writeln!(out, "Model: {}", info.model)?;
    if let Some(accuracy) = info.accuracy {
        writeln!(out, "Accuracy: {:.2}%", accuracy * 100.0)?;
    }
    writeln!(out, "Diseases: {}", info.diseases)?;
    writeln!(out, "Symptoms: {}", info.symptoms)?;
    writeln!(out, "Status: {}", info.status)?;
    writeln!(out, "Timestamp: {}", info.timestamp.to_rfc3339())?;
    Ok(())
}

/// Write the symptom vocabulary.
pub fn write_symptoms<W: Write>(
    out: &mut W,
    symptoms: &[String],
    args: &CaduceusArgs,
) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return write_json(out, symptoms, args);
    }

    for symptom in symptoms {
        writeln!(out, "{symptom}")?;
    }
    if args.verbosity() > 1 {
        writeln!(out)?;
        writeln!(out, "{} symptoms", symptoms.len())?;
    }
    Ok(())
}

fn write_prediction_human<W: Write>(
    out: &mut W,
    result: &PredictionResult,
    args: &CaduceusArgs,
) -> Result<()> {
    writeln!(out, "Prediction: {}", result.disease)?;
    writeln!(out, "═══════════")?;
    writeln!(out, "Confidence: {:.2}%", result.confidence)?;
    writeln!(out, "Severity: {}", result.severity)?;
    writeln!(out, "Model: {}", result.model_used)?;
    writeln!(out, "Matched symptoms: {}", result.matched_symptoms.join(", "))?;

    let descriptions: Vec<_> = result
        .description
        .iter()
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if !descriptions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Description:")?;
        for (locale, text) in descriptions {
            writeln!(out, "  [{locale}] {text}")?;
        }
    }

    if !result.precautions.is_empty() {
        writeln!(out)?;
        writeln!(out, "Precautions:")?;
        for (i, precaution) in result.precautions.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, format_localized(precaution))?;
        }
    }

    if args.verbosity() > 1 && !result.comparison.is_empty() {
        writeln!(out)?;
        writeln!(out, "Model comparison:")?;
        for candidate in &result.comparison {
            writeln!(
                out,
                "  {:<24} {:<24} {:>7.2}%",
                candidate.model, candidate.disease, candidate.confidence
            )?;
        }
    }
    Ok(())
}

fn write_rejection_human<W: Write>(out: &mut W, reason: Rejection) -> Result<()> {
    writeln!(out, "Cannot determine a result: {reason}")?;
    Ok(())
}

fn format_localized(row: &Localized) -> String {
    row.iter()
        .map(|(locale, text)| format!("[{locale}] {text}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::scoring::PredictionCandidate;

    fn args(extra: &[&str]) -> CaduceusArgs {
        let mut argv = vec!["caduceus"];
        argv.extend_from_slice(extra);
        argv.push("info");
        CaduceusArgs::try_parse_from(argv).unwrap()
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn result() -> PredictionResult {
        let candidate = PredictionCandidate {
            model: "Naive Bayes".to_string(),
            disease: "Viral Fever".to_string(),
            confidence: 91.5,
        };
        PredictionResult {
            disease: "Viral Fever".to_string(),
            confidence: 91.5,
            severity: "Medium".to_string(),
            description: [("en".to_string(), "A viral infection".to_string())]
                .into_iter()
                .collect(),
            precautions: vec![[("en".to_string(), "Rest".to_string())].into_iter().collect()],
            matched_symptoms: vec!["fever".to_string(), "chills".to_string()],
            comparison: vec![candidate],
            model_used: "Naive Bayes".to_string(),
        }
    }

    #[test]
    fn test_human_prediction() {
        let outcome = PredictOutcome::Predicted(result());
        let text = render(|out| write_outcome(out, &outcome, &args(&[])));
        assert!(text.contains("Prediction: Viral Fever"));
        assert!(text.contains("Confidence: 91.50%"));
        assert!(text.contains("Matched symptoms: fever, chills"));
        assert!(text.contains("1. [en] Rest"));
        assert!(!text.contains("Model comparison"));
    }

    #[test]
    fn test_json_rejection() {
        let outcome = PredictOutcome::from(Rejection::NoUsableInput);
        let text = render(|out| write_outcome(out, &outcome, &args(&["-f", "json"])));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["error"], Rejection::NoUsableInput.message());
    }

    #[test]
    fn test_json_validation_uses_match_key() {
        let validation = Validation {
            symptom: Some("fever".to_string()),
            score: 100,
            valid: true,
        };
        let text = render(|out| write_validation(out, &validation, &args(&["-f", "json"])));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["match"], "fever");
        assert_eq!(value["score"], 100);
        assert_eq!(value["valid"], true);
    }

    #[test]
    fn test_human_validation_suggests() {
        let validation = Validation {
            symptom: Some("headache".to_string()),
            score: 55,
            valid: false,
        };
        let text = render(|out| write_validation(out, &validation, &args(&[])));
        assert_eq!(text, "Not recognized. Did you mean: headache? (score 55)\n");
    }

    #[test]
    fn test_batch_human() {
        let outcomes = vec![
            PredictOutcome::Predicted(result()),
            PredictOutcome::from(Rejection::NoPredictionAvailable),
        ];
        let text = render(|out| write_batch(out, &outcomes, &args(&[])));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Viral Fever (91.50%, Naive Bayes)"));
        assert!(lines[1].contains(Rejection::NoPredictionAvailable.message()));
    }
}
