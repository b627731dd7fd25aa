//! Text-table ingest and cleaning.
//!
//! This module turns the two raw tables (survey CSV, death-count TSV) into the
//! clean rows the models are built from.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail fast** on malformed rows (exit code 3, every bad line listed)
//! - **Two tolerated drops**: the "All ages" aggregate row and death rows with
//!   no `Both Sexes` count
//! - **No model logic here**: contiguity and rate bounds are checked by the models

use std::collections::HashMap;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{DeathCount, SurveyObservation};
use crate::error::AppError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed survey table.
#[derive(Debug, Clone)]
pub struct SurveyIngest {
    pub observations: Vec<SurveyObservation>,
    pub rows_read: usize,
}

/// Parsed and cleaned death table.
#[derive(Debug, Clone)]
pub struct DeathIngest {
    pub counts: Vec<DeathCount>,
    /// Rows dropped for a missing/NaN `Both Sexes` count.
    pub dropped_rows: Vec<RowError>,
    /// "All ages" style aggregate rows removed before use.
    pub aggregate_rows: usize,
    pub rows_read: usize,
}

/// Parse a survey table with columns `Age`, `Male`, `Female` (percent).
pub fn parse_survey_table(text: &str) -> Result<SurveyIngest, AppError> {
    let (mut reader, header_map) = open_table(text, "survey")?;
    for column in ["age", "male", "female"] {
        ensure_column(&header_map, column, "survey")?;
    }

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_survey_row(&record, &header_map));
        match parsed {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        return Err(malformed_rows("survey", &row_errors));
    }
    if observations.is_empty() {
        return Err(AppError::new(3, "Survey table has no valid rows."));
    }
    debug!(rows = observations.len(), "parsed survey table");

    Ok(SurveyIngest {
        observations,
        rows_read,
    })
}

/// Parse a death table with columns `Age`, `Both Sexes` (others ignored).
///
/// The aggregate row is removed, rows with a missing count are dropped and
/// ages are coerced to integers. Any other bad row fails the whole table.
pub fn parse_death_table(text: &str) -> Result<DeathIngest, AppError> {
    let (mut reader, header_map) = open_table(text, "death")?;
    for column in ["age", "both sexes"] {
        ensure_column(&header_map, column, "death")?;
    }

    let mut counts = Vec::new();
    let mut row_errors = Vec::new();
    let mut dropped_rows = Vec::new();
    let mut aggregate_rows = 0usize;
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let age_label = get_optional(&record, &header_map, "age").unwrap_or("");
        if is_aggregate_label(age_label) {
            aggregate_rows += 1;
            continue;
        }

        let age = match get_required(&record, &header_map, "age").and_then(parse_age) {
            Ok(age) => age,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };
        match get_optional(&record, &header_map, "both sexes").and_then(parse_number) {
            Some(count) => counts.push(DeathCount { age, count }),
            None => dropped_rows.push(RowError {
                line,
                message: format!("Missing `Both Sexes` count at age {age}; row dropped."),
            }),
        }
    }

    if !row_errors.is_empty() {
        return Err(malformed_rows("death", &row_errors));
    }
    for dropped in &dropped_rows {
        warn!(table = "death", line = dropped.line, "{}", dropped.message);
    }
    if counts.is_empty() {
        return Err(AppError::new(3, "Death table has no valid rows."));
    }
    debug!(
        rows = counts.len(),
        dropped = dropped_rows.len(),
        aggregate_rows,
        "parsed death table"
    );

    Ok(DeathIngest {
        counts,
        dropped_rows,
        aggregate_rows,
        rows_read,
    })
}

fn open_table<'a>(
    text: &'a str,
    label: &str,
) -> Result<(csv::Reader<&'a [u8]>, HashMap<String, usize>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read {label} table headers: {e}")))?
        .clone();

    Ok((reader, build_header_map(&headers)))
}

/// Tab-separated when the header line contains a tab, else comma-separated.
fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.contains('\t') { b'\t' } else { b',' }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_ascii_lowercase().replace('_', " ")
}

fn ensure_column(header_map: &HashMap<String, usize>, name: &str, label: &str) -> Result<(), AppError> {
    if header_map.contains_key(name) {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Missing required column in {label} table: `{name}`"),
        ))
    }
}

fn parse_survey_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SurveyObservation, String> {
    let age = parse_age(get_required(record, header_map, "age")?)?;
    let male = parse_number(get_required(record, header_map, "male")?)
        .ok_or_else(|| "Missing/invalid `Male` rate.".to_string())?;
    let female = parse_number(get_required(record, header_map, "female")?)
        .ok_or_else(|| "Missing/invalid `Female` rate.".to_string())?;
    Ok(SurveyObservation { age, male, female })
}

fn is_aggregate_label(label: &str) -> bool {
    label.trim().to_ascii_lowercase().starts_with("all")
}

/// Integer ages; `"42.0"` is accepted, `"42.5"` is not.
fn parse_age(s: &str) -> Result<i32, String> {
    if let Ok(age) = s.parse::<i32>() {
        return Ok(age);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => Ok(v as i32),
        _ => Err(format!("Invalid age '{s}': expected an integer.")),
    }
}

/// Finite number, tolerating thousands separators; `NaN`/empty are `None`.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace(',', "");
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Exit code 3 listing every malformed line.
fn malformed_rows(label: &str, row_errors: &[RowError]) -> AppError {
    let details: Vec<String> = row_errors
        .iter()
        .map(|err| format!("line {}: {}", err.line, err.message))
        .collect();
    AppError::new(
        3,
        format!(
            "Malformed {label} table ({} bad rows): {}",
            row_errors.len(),
            details.join("; ")
        ),
    )
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}
