//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the survey and death tables
//! - runs the estimator or the sampling simulation
//! - prints reports/plots
//! - writes optional exports and re-plots saved runs

use clap::Parser;

use crate::cli::{Command, EstimateArgs, ModelArgs, PlotArgs, RatesArgs, SimulateArgs, SourceArgs};
use crate::domain::{
    DEFAULT_STUDY_YEARS, EstimateConfig, ModelConfig, RatesConfig, RunFile, SimulateConfig, TableSources,
};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `handage` binary.
pub fn run() -> Result<(), AppError> {
    // `handage` and `handage -y 2018` behave like `handage estimate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Estimate(args) => handle_estimate(&args),
        Command::Rates(args) => handle_rates(&args),
        Command::Simulate(args) => handle_simulate(&args),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn handle_estimate(args: &EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(args);
    let run = pipeline::run_estimate(&config)?;

    println!(
        "{}",
        crate::report::format_estimate_summary(&run.models.survey, &run.models.deaths, &run.estimates)
    );

    if config.plot {
        for est in &run.estimates {
            println!(
                "{}",
                crate::plot::render_distribution_plot(est, config.plot_width, config.plot_height)
            );
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_estimates_csv(path, &run.estimates)?;
    }
    if let Some(path) = &config.export_json {
        let file = crate::io::run_file::build_run_file(
            &config.model,
            &run.models.survey,
            &run.models.deaths,
            &run.estimates,
        );
        crate::io::run_file::write_run_json(path, &file)?;
    }
    if let Some(path) = &config.svg {
        crate::plot::write_distribution_svg(path, &run.estimates, crate::plot::DEFAULT_SVG_SIZE)?;
    }

    Ok(())
}

fn handle_rates(args: &RatesArgs) -> Result<(), AppError> {
    let config = rates_config_from_args(args);
    let survey = pipeline::run_rates(&config)?;

    println!("{}", crate::report::format_survey_table(survey.rates(), config.head));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_rate_plot(survey.rates(), config.plot_width, config.plot_height)
        );
    }
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(args);
    let summary = pipeline::run_simulate(&config)?;
    println!("{}", crate::report::format_sampling_summary(&summary));
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let run = crate::io::run_file::read_run_json(&args.run)?;
    println!("{}", render_saved_run(&run, args.width, args.height));
    if let Some(path) = &args.svg {
        crate::plot::write_distribution_svg(path, &run.estimates, crate::plot::DEFAULT_SVG_SIZE)?;
    }
    Ok(())
}

/// Plots and gap lines for every study year in a saved run.
fn render_saved_run(run: &RunFile, width: usize, height: usize) -> String {
    let mut out = format!("Run generated by {} at {}\n", run.tool, run.generated_at);
    for est in &run.estimates {
        out.push('\n');
        out.push_str(&crate::plot::render_distribution_plot(est, width, height));
        out.push_str(&crate::report::format_gap_line(est.age_gap()));
        out.push('\n');
    }
    out
}

fn sources_from_args(args: &SourceArgs) -> TableSources {
    TableSources {
        survey: args.survey.clone(),
        deaths: args.deaths.clone(),
    }
}

fn model_from_args(args: &ModelArgs) -> ModelConfig {
    ModelConfig {
        reference_survey_year: args.reference_year,
        extrapolation_sample_size: args.edge_rows,
    }
}

pub fn estimate_config_from_args(args: &EstimateArgs) -> EstimateConfig {
    let study_years = if args.study_years.is_empty() {
        DEFAULT_STUDY_YEARS.to_vec()
    } else {
        args.study_years.clone()
    };
    EstimateConfig {
        sources: sources_from_args(&args.sources),
        model: model_from_args(&args.model),
        study_years,
        age_min: args.age_min,
        age_max: args.age_max,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        svg: args.svg.clone(),
    }
}

pub fn rates_config_from_args(args: &RatesArgs) -> RatesConfig {
    RatesConfig {
        sources: sources_from_args(&args.sources),
        model: model_from_args(&args.model),
        head: args.head,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

pub fn simulate_config_from_args(args: &SimulateArgs) -> SimulateConfig {
    SimulateConfig {
        sources: sources_from_args(&args.sources),
        model: model_from_args(&args.model),
        study_year: args.study_year,
        cohort_size: args.cohort_size,
        trials: args.trials,
        seed: args.seed,
        threshold: args.threshold,
    }
}

/// Rewrite argv so `handage` defaults to `handage estimate`.
///
/// Rules:
/// - `handage`                          -> `handage estimate`
/// - `handage -y 2018 ...`              -> `handage estimate -y 2018 ...`
/// - `handage --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("estimate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "rates" | "simulate" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "estimate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
        return argv;
    }

    argv
}
