//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Year of the National Geographic handedness survey the default rates come from.
pub const DEFAULT_REFERENCE_SURVEY_YEAR: i32 = 1986;

/// Number of edge survey rows averaged to extrapolate beyond the surveyed birth years.
pub const DEFAULT_EXTRAPOLATION_SAMPLE_SIZE: usize = 10;

/// Study years evaluated when none are given: the year of the published study and a recent one.
pub const DEFAULT_STUDY_YEARS: [i32; 2] = [1990, 2018];

/// Reported hand preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn display_name(self) -> &'static str {
        match self {
            Handedness::Left => "left-handed",
            Handedness::Right => "right-handed",
        }
    }

    /// Map a left-handedness probability onto this group.
    pub fn apply(self, p_left: f64) -> f64 {
        match self {
            Handedness::Left => p_left,
            Handedness::Right => 1.0 - p_left,
        }
    }
}

/// One raw survey row: left-handedness rates (percent) reported at a given age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyObservation {
    pub age: i32,
    pub male: f64,
    pub female: f64,
}

/// A survey row keyed by birth year, with the sex-averaged rate.
///
/// All rates are percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyRate {
    pub age: i32,
    pub birth_year: i32,
    pub male_rate: f64,
    pub female_rate: f64,
    pub mean_rate: f64,
}

/// Number of deaths recorded at one age in the reference year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathCount {
    pub age: i32,
    pub count: f64,
}

/// The calendar year in which the Bayes calculation is evaluated.
///
/// Determines the join `birth_year = study_year - age_of_death`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyParameters {
    pub study_year: i32,
}

impl StudyParameters {
    pub fn birth_year(&self, age_of_death: i32) -> i32 {
        self.study_year - age_of_death
    }
}

/// Named model constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Year the survey was taken; `birth_year = reference_survey_year - age`.
    pub reference_survey_year: i32,
    /// How many rows at each end of the survey are averaged for extrapolation.
    pub extrapolation_sample_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            reference_survey_year: DEFAULT_REFERENCE_SURVEY_YEAR,
            extrapolation_sample_size: DEFAULT_EXTRAPOLATION_SAMPLE_SIZE,
        }
    }
}

/// Where the two input tables come from.
///
/// `None` means: use the environment override, else the published default URL.
#[derive(Debug, Clone, Default)]
pub struct TableSources {
    pub survey: Option<String>,
    pub deaths: Option<String>,
}

/// Full configuration for `handage estimate`.
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub sources: TableSources,
    pub model: ModelConfig,
    pub study_years: Vec<i32>,
    /// Query window; defaults to the death table's full age range.
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub svg: Option<PathBuf>,
}

/// Configuration for `handage rates`.
#[derive(Debug, Clone)]
pub struct RatesConfig {
    pub sources: TableSources,
    pub model: ModelConfig,
    pub head: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// Configuration for `handage simulate`.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub sources: TableSources,
    pub model: ModelConfig,
    pub study_year: i32,
    pub cohort_size: usize,
    pub trials: usize,
    pub seed: u64,
    pub threshold: f64,
}

/// Everything computed for one study year.
///
/// All vectors are indexed 1:1 with `ages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyEstimate {
    pub study_year: i32,
    pub ages: Vec<i32>,
    /// P(LH | A).
    pub p_lh_given_age: Vec<f64>,
    /// P(A), normalized over the whole death table.
    pub p_age: Vec<f64>,
    /// P(A | LH).
    pub p_age_given_lh: Vec<f64>,
    /// P(A | RH).
    pub p_age_given_rh: Vec<f64>,
    /// P(LH) over everyone who died in the study year.
    pub p_left: f64,
    pub mean_age_left: f64,
    pub mean_age_right: f64,
}

impl StudyEstimate {
    /// Right-handed minus left-handed mean age at death (years).
    pub fn age_gap(&self) -> f64 {
        self.mean_age_right - self.mean_age_left
    }

    pub fn distribution(&self, hand: Handedness) -> &[f64] {
        match hand {
            Handedness::Left => &self.p_age_given_lh,
            Handedness::Right => &self.p_age_given_rh,
        }
    }
}

/// Portable JSON representation of an `estimate` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub model: ModelConfig,
    pub survey_rows: usize,
    pub death_age_range: [i32; 2],
    pub death_total: f64,
    pub estimates: Vec<StudyEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handedness_complements_probability() {
        assert_eq!(Handedness::Left.apply(0.1), 0.1);
        assert!((Handedness::Right.apply(0.1) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn birth_year_joins_on_study_year() {
        let params = StudyParameters { study_year: 1990 };
        assert_eq!(params.birth_year(90), 1900);
        assert_eq!(params.birth_year(14), 1976);
    }
}
