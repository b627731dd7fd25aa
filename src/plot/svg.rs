//! Plotters-powered SVG chart of P(A | LH) and P(A | RH).
//!
//! One line per handedness group and study year, so a 1990 run and a 2018 run
//! can be compared on the same axes.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{Handedness, StudyEstimate};
use crate::error::AppError;

pub const DEFAULT_SVG_SIZE: (u32, u32) = (960, 540);

/// Render every estimate into one SVG line chart.
pub fn write_distribution_svg(path: &Path, estimates: &[StudyEstimate], size: (u32, u32)) -> Result<(), AppError> {
    let (x0, x1, y1) = bounds(estimates)
        .ok_or_else(|| AppError::new(4, "Nothing to chart: estimates have no finite probabilities."))?;

    draw(path, estimates, size, (x0, x1), y1)
        .map_err(|e| AppError::new(4, format!("Failed to render SVG '{}': {e}", path.display())))
}

fn draw(
    path: &Path,
    estimates: &[StudyEstimate],
    size: (u32, u32),
    x_range: (f64, f64),
    y_max: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Probability of age at death by handedness", ("sans-serif", 20))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range.0..x_range.1, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Age at death")
        .y_desc("P(age | hand)")
        .x_labels(12)
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()?;

    for (idx, est) in estimates.iter().enumerate() {
        for (offset, hand) in Handedness::ALL.into_iter().enumerate() {
            let color = Palette99::pick(idx * 2 + offset).to_rgba();
            let points: Vec<(f64, f64)> = est
                .ages
                .iter()
                .zip(est.distribution(hand))
                .filter(|(_, p)| p.is_finite())
                .map(|(&age, &p)| (age as f64, p))
                .collect();

            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                .label(format!("{} ({})", hand.display_name(), est.study_year))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// `(age_min, age_max, p_max)` over all finite points, padded so lines clear the frame.
fn bounds(estimates: &[StudyEstimate]) -> Option<(f64, f64, f64)> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_max: f64 = 0.0;
    for est in estimates {
        for hand in Handedness::ALL {
            for (&age, &p) in est.ages.iter().zip(est.distribution(hand)) {
                if p.is_finite() {
                    x_min = x_min.min(age as f64);
                    x_max = x_max.max(age as f64);
                    y_max = y_max.max(p);
                }
            }
        }
    }
    if !(x_min.is_finite() && x_max.is_finite()) {
        return None;
    }
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
    Some((x_min, x_max, y_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::BayesEstimator;
    use crate::model::fixtures::{bell_distribution, synthetic_survey_model};

    #[test]
    fn writes_svg_document() {
        let survey = synthetic_survey_model();
        let deaths = bell_distribution();
        let est = BayesEstimator::new(&survey, &deaths);
        let ages: Vec<i32> = (6..=110).collect();
        let estimates = vec![est.estimate(&ages, 1990).unwrap(), est.estimate(&ages, 2018).unwrap()];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        write_distribution_svg(&path, &estimates, DEFAULT_SVG_SIZE).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("left-handed (1990)"));
        assert!(svg.contains("right-handed (2018)"));
    }

    #[test]
    fn bounds_cover_all_series() {
        let survey = synthetic_survey_model();
        let deaths = bell_distribution();
        let est = BayesEstimator::new(&survey, &deaths);
        let run = est.estimate(&[60, 70, 80], 1990).unwrap();
        let (x0, x1, y1) = bounds(std::slice::from_ref(&run)).unwrap();
        assert_eq!((x0, x1), (60.0, 80.0));
        let peak = run
            .p_age_given_lh
            .iter()
            .chain(&run.p_age_given_rh)
            .fold(0.0f64, |a, &b| a.max(b));
        assert!((y1 - peak * 1.1).abs() < 1e-12);
        assert!(bounds(&[]).is_none());
    }
}
