//! Read/write run JSON files.
//!
//! The run file is the portable representation of an `estimate` run:
//! - model constants (reference survey year, extrapolation window)
//! - input table shape (survey rows, death-table ages and total)
//! - every study year's per-age distributions and mean ages
//!
//! The schema is defined by `domain::RunFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::domain::{ModelConfig, RunFile, StudyEstimate};
use crate::error::AppError;
use crate::model::{DeathAgeDistribution, SurveyRateModel};

pub const TOOL_NAME: &str = "handage";

/// Assemble the run file for a finished run.
pub fn build_run_file(
    config: &ModelConfig,
    survey: &SurveyRateModel,
    deaths: &DeathAgeDistribution,
    estimates: &[StudyEstimate],
) -> RunFile {
    RunFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Local::now().to_rfc3339(),
        model: *config,
        survey_rows: survey.rates().len(),
        death_age_range: [deaths.min_age(), deaths.max_age()],
        death_total: deaths.total(),
        estimates: estimates.to_vec(),
    }
}

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create run JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, run)
        .map_err(|e| AppError::new(2, format!("Failed to write run JSON: {e}")))?;

    Ok(())
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: RunFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid run JSON: {e}")))?;
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::BayesEstimator;
    use crate::model::fixtures::{synthetic_survey_model, uniform_distribution};

    #[test]
    fn run_file_survives_disk() {
        let survey = synthetic_survey_model();
        let deaths = uniform_distribution();
        let est = BayesEstimator::new(&survey, &deaths);
        let estimates = vec![est.estimate(&(6..=115).collect::<Vec<_>>(), 1990).unwrap()];
        let run = build_run_file(&ModelConfig::default(), &survey, &deaths, &estimates);

        assert_eq!(run.tool, "handage");
        assert_eq!(run.survey_rows, 77);
        assert_eq!(run.death_age_range, [0, 119]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        write_run_json(&path, &run).unwrap();
        let back = read_run_json(&path).unwrap();
        assert_eq!(back.generated_at, run.generated_at);
        assert_eq!(back.model, run.model);
        assert_eq!(back.estimates.len(), 1);
        assert_eq!(back.estimates[0].ages, estimates[0].ages);
        assert!((back.estimates[0].age_gap() - estimates[0].age_gap()).abs() < 1e-9);
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"tool\": 3}").unwrap();
        assert_eq!(read_run_json(&path).unwrap_err().exit_code(), 2);
    }
}
