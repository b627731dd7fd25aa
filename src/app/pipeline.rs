//! Shared pipeline logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch tables -> ingest/clean -> build models -> estimate / simulate
//!
//! The `*_with_tables` variants never touch the network, so tests drive them with
//! in-memory table text.

use tracing::info;

use crate::data::{TableFetcher, resolve_sources};
use crate::domain::{
    EstimateConfig, ModelConfig, RatesConfig, SimulateConfig, StudyEstimate, TableSources,
};
use crate::error::AppError;
use crate::estimate::{BayesEstimator, SamplingConfig, SamplingSummary, simulate_age_gap};
use crate::io::ingest::{DeathIngest, SurveyIngest, parse_death_table, parse_survey_table};
use crate::model::{DeathAgeDistribution, SurveyRateModel};

/// Cleaned rows of both input tables.
#[derive(Debug, Clone)]
pub struct Tables {
    pub survey: SurveyIngest,
    pub deaths: DeathIngest,
}

impl Tables {
    /// Parse and clean raw table text.
    pub fn from_text(survey_text: &str, deaths_text: &str) -> Result<Self, AppError> {
        Ok(Self {
            survey: parse_survey_table(survey_text)?,
            deaths: parse_death_table(deaths_text)?,
        })
    }
}

/// Both input models, built from cleaned tables.
#[derive(Debug, Clone)]
pub struct Models {
    pub survey: SurveyRateModel,
    pub deaths: DeathAgeDistribution,
}

impl Models {
    pub fn build(tables: &Tables, config: &ModelConfig) -> Result<Self, AppError> {
        let survey = SurveyRateModel::new(&tables.survey.observations, config)?;
        let deaths = DeathAgeDistribution::new(&tables.deaths.counts)?;
        info!(
            survey_rows = survey.rates().len(),
            death_ages = deaths.len(),
            death_total = deaths.total(),
            "models ready"
        );
        Ok(Self { survey, deaths })
    }

    pub fn estimator(&self) -> BayesEstimator<'_> {
        BayesEstimator::new(&self.survey, &self.deaths)
    }
}

/// All computed outputs of a single `handage estimate` run.
#[derive(Debug, Clone)]
pub struct EstimateOutput {
    pub models: Models,
    pub estimates: Vec<StudyEstimate>,
}

/// Fetch both tables from their resolved sources.
pub fn fetch_tables(sources: &TableSources) -> Result<Tables, AppError> {
    let resolved = resolve_sources(sources);
    let fetcher = TableFetcher::new();

    info!(source = %resolved.survey.describe(), "loading survey table");
    let survey_text = fetcher.fetch_text(&resolved.survey)?;
    info!(source = %resolved.deaths.describe(), "loading death table");
    let deaths_text = fetcher.fetch_text(&resolved.deaths)?;

    Tables::from_text(&survey_text, &deaths_text)
}

/// Execute the full estimate pipeline.
pub fn run_estimate(config: &EstimateConfig) -> Result<EstimateOutput, AppError> {
    let tables = fetch_tables(&config.sources)?;
    run_estimate_with_tables(config, &tables)
}

/// Execute the estimate pipeline with pre-loaded tables.
pub fn run_estimate_with_tables(config: &EstimateConfig, tables: &Tables) -> Result<EstimateOutput, AppError> {
    if config.study_years.is_empty() {
        return Err(AppError::new(2, "At least one study year is required."));
    }

    let models = Models::build(tables, &config.model)?;
    let age_min = config.age_min.unwrap_or(models.deaths.min_age());
    let age_max = config.age_max.unwrap_or(models.deaths.max_age());
    if age_min > age_max {
        return Err(AppError::new(
            2,
            format!("Invalid age range: --age-min {age_min} is above --age-max {age_max}."),
        ));
    }
    let ages: Vec<i32> = (age_min..=age_max).collect();

    let estimator = models.estimator();
    let mut estimates = Vec::with_capacity(config.study_years.len());
    for &study_year in &config.study_years {
        let est = estimator.estimate(&ages, study_year)?;
        info!(
            study_year,
            p_left = est.p_left,
            mean_age_left = est.mean_age_left,
            mean_age_right = est.mean_age_right,
            "study year estimated"
        );
        estimates.push(est);
    }

    Ok(EstimateOutput { models, estimates })
}

/// Load the survey and build its rate model.
pub fn run_rates(config: &RatesConfig) -> Result<SurveyRateModel, AppError> {
    let tables = fetch_tables(&config.sources)?;
    run_rates_with_tables(config, &tables)
}

pub fn run_rates_with_tables(config: &RatesConfig, tables: &Tables) -> Result<SurveyRateModel, AppError> {
    Ok(SurveyRateModel::new(&tables.survey.observations, &config.model)?)
}

/// Execute the Monte-Carlo sampling pipeline.
pub fn run_simulate(config: &SimulateConfig) -> Result<SamplingSummary, AppError> {
    let tables = fetch_tables(&config.sources)?;
    run_simulate_with_tables(config, &tables)
}

pub fn run_simulate_with_tables(config: &SimulateConfig, tables: &Tables) -> Result<SamplingSummary, AppError> {
    let models = Models::build(tables, &config.model)?;
    let sampling = SamplingConfig {
        study_year: config.study_year,
        cohort_size: config.cohort_size,
        trials: config.trials,
        seed: config.seed,
        threshold: config.threshold,
    };
    Ok(simulate_age_gap(&models.estimator(), &sampling)?)
}
