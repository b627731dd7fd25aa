//! Command-line parsing for the handedness age-at-death estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_EXTRAPOLATION_SAMPLE_SIZE, DEFAULT_REFERENCE_SURVEY_YEAR};
use crate::estimate::PUBLISHED_AGE_GAP;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "handage", version, about = "Bayesian age-at-death estimates by handedness")]
pub struct Cli {
    /// Log pipeline detail to stderr (overridden by HANDAGE_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate P(A | LH), P(A | RH) and the mean-age gap for each study year.
    Estimate(EstimateArgs),
    /// Print the survey rates by birth year.
    Rates(RatesArgs),
    /// Simulate the age gap a finite study cohort would observe.
    Simulate(SimulateArgs),
    /// Re-plot a run saved with `handage estimate --export-json`.
    Plot(PlotArgs),
}

/// Where the two input tables come from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Survey table (path or http(s) URL) with columns Age, Male, Female.
    ///
    /// Defaults to HANDAGE_SURVEY_URL, then the published 1986 survey.
    #[arg(long, value_name = "PATH|URL")]
    pub survey: Option<String>,

    /// Death table (path or http(s) URL) with columns Age, Both Sexes.
    ///
    /// Defaults to HANDAGE_DEATHS_URL, then the published 1999 US table.
    #[arg(long, value_name = "PATH|URL")]
    pub deaths: Option<String>,
}

/// Model constants.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Year the handedness survey was taken.
    #[arg(long, default_value_t = DEFAULT_REFERENCE_SURVEY_YEAR)]
    pub reference_year: i32,

    /// Survey rows averaged at each edge for extrapolation.
    #[arg(long, default_value_t = DEFAULT_EXTRAPOLATION_SAMPLE_SIZE)]
    pub edge_rows: usize,
}

/// Options for `handage estimate`.
#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Study year to evaluate (repeatable; default 1990 and 2018).
    #[arg(short = 'y', long = "study-year", value_name = "YEAR")]
    pub study_years: Vec<i32>,

    /// Smallest age of death to evaluate (default: youngest age in the death table).
    #[arg(long)]
    pub age_min: Option<i32>,

    /// Largest age of death to evaluate (default: oldest age in the death table).
    #[arg(long)]
    pub age_max: Option<i32>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-age probabilities to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full run (config + estimates) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Write an SVG chart of both conditional distributions.
    #[arg(long)]
    pub svg: Option<PathBuf>,
}

/// Options for `handage rates`.
#[derive(Debug, Args, Clone)]
pub struct RatesArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of survey rows to print.
    #[arg(long, default_value_t = 10)]
    pub head: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `handage simulate`.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Study year the cohort died in.
    #[arg(short = 'y', long = "study-year", default_value_t = 1990)]
    pub study_year: i32,

    /// Deaths sampled per trial.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub cohort_size: usize,

    /// Number of independent trials.
    #[arg(long, default_value_t = 1000)]
    pub trials: usize,

    /// Random seed (trials are reproducible for a fixed seed).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Report the share of trials whose gap reaches this many years.
    #[arg(long, default_value_t = PUBLISHED_AGE_GAP)]
    pub threshold: f64,
}

/// Options for plotting a saved run.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Run JSON file produced by `handage estimate --export-json`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Also write an SVG chart.
    #[arg(long)]
    pub svg: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_flags_parse() {
        let cli = Cli::parse_from([
            "handage",
            "estimate",
            "-y",
            "1990",
            "--study-year",
            "2018",
            "--deaths",
            "deaths.tsv",
            "--no-plot",
            "--age-min",
            "6",
        ]);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.study_years, vec![1990, 2018]);
        assert_eq!(args.sources.deaths.as_deref(), Some("deaths.tsv"));
        assert!(args.sources.survey.is_none());
        assert!(args.no_plot);
        assert_eq!(args.age_min, Some(6));
        assert_eq!(args.model.reference_year, 1986);
        assert_eq!(args.model.edge_rows, 10);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["handage", "simulate", "--verbose", "--trials", "5"]);
        assert!(cli.verbose);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.trials, 5);
        assert_eq!(args.threshold, 9.0);
    }
}
