//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model/estimator code stays clean and testable
//! - output changes are localized (easy to pin with snapshot tests)

use crate::domain::{Handedness, StudyEstimate, SurveyRate};
use crate::estimate::SamplingSummary;
use crate::math::age_std_dev;
use crate::model::{DeathAgeDistribution, SurveyRateModel};

/// Format the full `estimate` summary (input tables + one block per study year).
pub fn format_estimate_summary(
    survey: &SurveyRateModel,
    deaths: &DeathAgeDistribution,
    estimates: &[StudyEstimate],
) -> String {
    let mut out = String::new();

    out.push_str("=== handage - Age at Death by Handedness ===\n");
    out.push_str(&format_inputs(survey, deaths));

    for est in estimates {
        out.push('\n');
        out.push_str(&format!("Study year {}:\n", est.study_year));
        if let (Some(first), Some(last)) = (est.ages.first(), est.ages.last()) {
            out.push_str(&format!("- ages: [{first}, {last}] ({} values)\n", est.ages.len()));
        }
        out.push_str(&format!("- P(LH) = {:.4}\n", est.p_left));
        for (hand, mean) in [
            (Handedness::Left, est.mean_age_left),
            (Handedness::Right, est.mean_age_right),
        ] {
            let label = if hand == Handedness::Left { "LH" } else { "RH" };
            let spread = age_std_dev(&est.ages, est.distribution(hand))
                .map(|sd| format!(" (sd {sd:.2})"))
                .unwrap_or_default();
            out.push_str(&format!("- mean age at death | {label} = {mean:.2}{spread}\n"));
        }
        out.push_str(&format_gap_line(est.age_gap()));
        out.push('\n');
    }

    out
}

/// `The difference in average ages is 11.8 years.`
pub fn format_gap_line(gap: f64) -> String {
    format!("The difference in average ages is {gap:.1} years.")
}

fn format_inputs(survey: &SurveyRateModel, deaths: &DeathAgeDistribution) -> String {
    let rates = survey.rates();
    let mut out = String::new();
    if let (Some(first), Some(last)) = (rates.first(), rates.last()) {
        out.push_str(&format!(
            "Survey: n={} | age=[{}, {}] | birth year=[{}, {}] | reference year {}\n",
            rates.len(),
            first.age,
            last.age,
            last.birth_year,
            first.birth_year,
            survey.reference_year(),
        ));
    }
    out.push_str(&format!(
        "Edge rates: young={:.2}% old={:.2}%\n",
        survey.young_edge_rate() * 100.0,
        survey.old_edge_rate() * 100.0,
    ));
    out.push_str(&format!(
        "Deaths: age=[{}, {}] | total={:.0}\n",
        deaths.min_age(),
        deaths.max_age(),
        deaths.total(),
    ));
    out
}

/// Format the first `head` survey rows with their derived columns.
pub fn format_survey_table(rates: &[SurveyRate], head: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:>10} {:>8} {:>8} {:>10}\n",
            "age", "birth_year", "male", "female", "mean_lh"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<5} {:-<10} {:-<8} {:-<8} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rates.iter().take(head) {
        out.push_str(
            format!(
                "{:>5} {:>10} {:>8.2} {:>8.2} {:>10.2}\n",
                r.age, r.birth_year, r.male_rate, r.female_rate, r.mean_rate
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if rates.len() > head {
        out.push_str(&format!("... {} more rows\n", rates.len() - head));
    }

    out
}

/// Format a Monte-Carlo sampling summary.
pub fn format_sampling_summary(summary: &SamplingSummary) -> String {
    let mut out = String::new();
    out.push_str("=== handage - Sampling Variability ===\n");
    out.push_str(&format!(
        "Study year {} | cohort={} | trials={} ({} degenerate)\n",
        summary.study_year, summary.cohort_size, summary.trials, summary.degenerate_trials
    ));
    out.push_str(&format!(
        "Gap (RH - LH): mean={:.2} sd={:.2} | p05={:.2} median={:.2} p95={:.2}\n",
        summary.mean_gap, summary.std_dev_gap, summary.p05, summary.median, summary.p95
    ));
    out.push_str(&format!(
        "P(gap >= {:.1} years) = {:.4}\n",
        summary.threshold, summary.fraction_at_least_threshold
    ));
    out
}
