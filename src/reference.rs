//! Disease reference tables.
//!
//! Three CSV tables enrich a predicted disease label: localized
//! descriptions, a severity tier, and localized precaution rows. They are
//! loaded once at startup. A missing or partially unreadable table is not
//! fatal: the problem is logged and the affected fields fall back to defaults.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};

use crate::error::{CaduceusError, Result};

/// File name of the description table.
pub const DESCRIPTION_FILE: &str = "disease_info.csv";
/// File name of the severity table.
pub const SEVERITY_FILE: &str = "disease_severity.csv";
/// File name of the precaution table.
pub const PRECAUTION_FILE: &str = "disease_precautions.csv";
/// File name of the optional symptom alias table.
pub const ALIAS_FILE: &str = "symptom_aliases.csv";

/// Localized strings keyed by locale code. Blank cells are never stored.
pub type LocalizedRow = HashMap<String, String>;

/// Everything known about one disease label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiseaseRecord {
    /// Description per locale, if the description table has a row.
    pub description: Option<LocalizedRow>,
    /// Severity tier.
    pub severity: Option<String>,
    /// Precaution rows in file order.
    pub precautions: Vec<LocalizedRow>,
}

/// All reference tables, keyed by disease label.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    records: HashMap<String, DiseaseRecord>,
}

impl ReferenceTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tables from `data_dir` for the given locales.
    ///
    /// Each table is optional; failures are logged and leave the table empty.
    pub fn load<P: AsRef<Path>>(data_dir: P, locales: &[&str]) -> Self {
        let data_dir = data_dir.as_ref();
        let mut tables = Self::new();

        let description_path = data_dir.join(DESCRIPTION_FILE);
        match tables.load_descriptions(&description_path, locales) {
            Ok(count) => info!("Loaded {count} disease descriptions"),
            Err(e) => warn!("Disease descriptions unavailable, using empty text: {e}"),
        }

        let severity_path = data_dir.join(SEVERITY_FILE);
        match tables.load_severities(&severity_path) {
            Ok(count) => info!("Loaded {count} disease severities"),
            Err(e) => warn!("Disease severities unavailable, using the default tier: {e}"),
        }

        let precaution_path = data_dir.join(PRECAUTION_FILE);
        match tables.load_precautions(&precaution_path, locales) {
            Ok(count) => info!("Loaded {count} precaution rows"),
            Err(e) => warn!("Disease precautions unavailable: {e}"),
        }

        tables
    }

    /// Record for a disease label.
    pub fn get(&self, disease: &str) -> Option<&DiseaseRecord> {
        self.records.get(disease)
    }

    /// Number of diseases with a description row.
    pub fn described_diseases(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.description.is_some())
            .count()
    }

    /// Set the description of a disease.
    pub fn insert_description<S: Into<String>>(&mut self, disease: S, description: LocalizedRow) {
        self.record_mut(disease).description = Some(description);
    }

    /// Set the severity of a disease.
    pub fn insert_severity<S: Into<String>, T: Into<String>>(&mut self, disease: S, severity: T) {
        self.record_mut(disease).severity = Some(severity.into());
    }

    /// Append a precaution row for a disease.
    pub fn push_precaution<S: Into<String>>(&mut self, disease: S, precaution: LocalizedRow) {
        self.record_mut(disease).precautions.push(precaution);
    }

    fn record_mut<S: Into<String>>(&mut self, disease: S) -> &mut DiseaseRecord {
        self.records.entry(disease.into()).or_default()
    }

    fn load_descriptions(&mut self, path: &Path, locales: &[&str]) -> Result<usize> {
        let mut count = 0;
        read_table(path, |record, columns| {
            let disease = cell(record, columns.disease)?;
            let row = localized_row(record, &columns.localized("description", locales));
            self.insert_description(disease, row);
            count += 1;
            Some(())
        })?;
        Ok(count)
    }

    fn load_severities(&mut self, path: &Path) -> Result<usize> {
        let mut count = 0;
        read_table(path, |record, columns| {
            let disease = cell(record, columns.disease)?;
            let severity = cell(record, columns.find("severity")?)?;
            self.insert_severity(disease, severity);
            count += 1;
            Some(())
        })?;
        Ok(count)
    }

    fn load_precautions(&mut self, path: &Path, locales: &[&str]) -> Result<usize> {
        let mut count = 0;
        read_table(path, |record, columns| {
            let disease = cell(record, columns.disease)?;
            let row = localized_row(record, &columns.localized("precaution", locales));
            self.push_precaution(disease, row);
            count += 1;
            Some(())
        })?;
        Ok(count)
    }
}

/// Header lookup for one table.
struct Columns {
    headers: StringRecord,
    disease: usize,
}

impl Columns {
    fn find(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// `(locale, column)` pairs for `<prefix>_<locale>` columns that exist.
    fn localized(&self, prefix: &str, locales: &[&str]) -> Vec<(String, usize)> {
        locales
            .iter()
            .filter_map(|locale| {
                self.find(&format!("{prefix}_{locale}"))
                    .map(|idx| (locale.to_string(), idx))
            })
            .collect()
    }
}

/// Stream every row of a CSV table through `on_row`.
///
/// Rows that fail to decode, or for which `on_row` returns `None`, are skipped
/// with a warning.
fn read_table<F>(path: &Path, mut on_row: F) -> Result<()>
where
    F: FnMut(&StringRecord, &Columns) -> Option<()>,
{
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CaduceusError::reference_data(format!("{}: {e}", path.display())))?;

    let headers = reader.headers()?.clone();
    let disease = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("disease"))
        .ok_or_else(|| {
            CaduceusError::reference_data(format!("{} has no 'disease' column", path.display()))
        })?;
    let columns = Columns { headers, disease };

    for (line, record) in reader.records().enumerate() {
        // Line numbers are 1-based and the header is line 1.
        let line = line + 2;
        match record {
            Ok(record) => {
                if on_row(&record, &columns).is_none() {
                    warn!("Skipping incomplete row {line} in {}", path.display());
                }
            }
            Err(e) => warn!("Skipping malformed row {line} in {}: {e}", path.display()),
        }
    }
    Ok(())
}

fn cell(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn localized_row(record: &StringRecord, columns: &[(String, usize)]) -> LocalizedRow {
    columns
        .iter()
        .filter_map(|(locale, idx)| cell(record, *idx).map(|value| (locale.clone(), value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const LOCALES: &[&str] = &["en", "hi", "ta"];

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_load_all_tables() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            DESCRIPTION_FILE,
            "disease,description_en,description_hi,description_ta\n\
             Viral Fever,A common viral infection,एक सामान्य वायरल संक्रमण,\n",
        );
        write(&dir, SEVERITY_FILE, "disease,severity\nViral Fever,Low\n");
        write(
            &dir,
            PRECAUTION_FILE,
            "disease,precaution_en,precaution_hi,precaution_ta\n\
             Viral Fever,Rest,आराम करें,ஓய்வு\n\
             Viral Fever,Drink fluids,,\n",
        );

        let tables = ReferenceTables::load(dir.path(), LOCALES);
        let record = tables.get("Viral Fever").unwrap();

        let description = record.description.as_ref().unwrap();
        assert_eq!(description["en"], "A common viral infection");
        assert!(!description.contains_key("ta"));
        assert_eq!(record.severity.as_deref(), Some("Low"));
        assert_eq!(record.precautions.len(), 2);
        assert_eq!(record.precautions[1]["en"], "Drink fluids");
        assert!(!record.precautions[1].contains_key("hi"));
        assert_eq!(tables.described_diseases(), 1);
    }

    #[test]
    fn test_missing_tables_degrade_to_empty() {
        let dir = TempDir::new().unwrap();
        let tables = ReferenceTables::load(dir.path(), LOCALES);
        assert!(tables.get("Viral Fever").is_none());
        assert_eq!(tables.described_diseases(), 0);
    }

    #[test]
    fn test_table_without_disease_column_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(&dir, SEVERITY_FILE, "name,severity\nViral Fever,Low\n");
        let tables = ReferenceTables::load(dir.path(), LOCALES);
        assert!(tables.get("Viral Fever").is_none());
    }

    #[test]
    fn test_incomplete_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            SEVERITY_FILE,
            "disease,severity\n,High\nMalaria,\nDengue,High\n",
        );
        let tables = ReferenceTables::load(dir.path(), LOCALES);
        assert!(tables.get("Malaria").is_none());
        assert_eq!(
            tables.get("Dengue").unwrap().severity.as_deref(),
            Some("High")
        );
    }
}
