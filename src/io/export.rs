//! Export per-age estimates to CSV.
//!
//! One row per (study year, age), meant to be easy to consume in spreadsheets
//! or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::StudyEstimate;
use crate::error::AppError;

pub const EXPORT_HEADER: &str = "study_year,age,p_lh_given_age,p_age,p_age_given_lh,p_age_given_rh";

/// Write every study year's per-age probabilities to a CSV file.
pub fn write_estimates_csv(path: &Path, estimates: &[StudyEstimate]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "{EXPORT_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for est in estimates {
        for (i, age) in est.ages.iter().enumerate() {
            writeln!(
                file,
                "{},{},{:.10},{:.10},{:.10},{:.10}",
                est.study_year,
                age,
                est.p_lh_given_age[i],
                est.p_age[i],
                est.p_age_given_lh[i],
                est.p_age_given_rh[i],
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_row_per_study_year_and_age() {
        let est = StudyEstimate {
            study_year: 1990,
            ages: vec![10, 11],
            p_lh_given_age: vec![0.13, 0.12],
            p_age: vec![0.5, 0.5],
            p_age_given_lh: vec![0.52, 0.48],
            p_age_given_rh: vec![0.49, 0.51],
            p_left: 0.125,
            mean_age_left: 10.48,
            mean_age_right: 10.51,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estimates.csv");
        write_estimates_csv(&path, &[est.clone(), StudyEstimate { study_year: 2018, ..est }]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(
            lines[1],
            "1990,10,0.1300000000,0.5000000000,0.5200000000,0.4900000000"
        );
        assert!(lines[4].starts_with("2018,11,"));
    }
}
