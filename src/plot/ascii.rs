//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - P(A | LH): `L` line
//! - P(A | RH): `R` line
//! - survey rates by birth year: `o` points

use crate::domain::{StudyEstimate, SurveyRate};

/// One drawable series.
#[derive(Debug, Clone)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
    pub glyph: char,
    /// Join consecutive points with a line instead of plotting markers.
    pub connect: bool,
}

/// Plot P(A | LH) and P(A | RH) against age for one study year.
pub fn render_distribution_plot(estimate: &StudyEstimate, width: usize, height: usize) -> String {
    let to_points = |probs: &[f64]| -> Vec<(f64, f64)> {
        estimate
            .ages
            .iter()
            .zip(probs)
            .map(|(&age, &p)| (age as f64, p))
            .collect()
    };

    // Left first: where the two lines share a cell, `L` stays visible.
    let series = [
        Series {
            points: to_points(&estimate.p_age_given_lh),
            glyph: 'L',
            connect: true,
        },
        Series {
            points: to_points(&estimate.p_age_given_rh),
            glyph: 'R',
            connect: true,
        },
    ];

    let mut out = format!("Study year {}\n", estimate.study_year);
    out.push_str(&render_plot(&series, "age", "P(age)", 4, width, height));
    out.push_str("L = P(A | LH), R = P(A | RH)\n");
    out
}

/// Scatter the survey's mean left-handedness rate against birth year.
pub fn render_rate_plot(rates: &[SurveyRate], width: usize, height: usize) -> String {
    let series = [Series {
        points: rates
            .iter()
            .map(|r| (r.birth_year as f64, r.mean_rate))
            .collect(),
        glyph: 'o',
        connect: false,
    }];
    render_plot(&series, "birth year", "mean LH rate (%)", 2, width, height)
}

fn render_plot(
    series: &[Series],
    x_label: &str,
    y_label: &str,
    y_precision: usize,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = axis_range(series, |&(x, _)| x).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = axis_range(series, |&(_, y)| y).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for s in series {
        if s.connect {
            draw_curve(&mut grid, &s.points, s.glyph, x_min, x_max, y_min, y_max);
        } else {
            for &(x, y) in s.points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
                let col = map_x(x, x_min, x_max, width);
                let row = map_y(y, y_min, y_max, height);
                grid[row][col] = s.glyph;
            }
        }
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.0}, {x_max:.0}] | {y_label}=[{:.*}, {:.*}]\n",
        y_precision, y_min, y_precision, y_max
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn axis_range(series: &[Series], pick: impl Fn(&(f64, f64)) -> f64) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in series.iter().flat_map(|s| s.points.iter()) {
        let v = pick(p);
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    glyph: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, glyph),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = glyph;
                }
            }
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Never overwrites a drawn cell.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(birth_year: i32, mean_rate: f64) -> SurveyRate {
        SurveyRate {
            age: 1986 - birth_year,
            birth_year,
            male_rate: mean_rate,
            female_rate: mean_rate,
            mean_rate,
        }
    }

    #[test]
    fn rate_plot_golden_snapshot_small() {
        let rates = [rate(1976, 13.0), rate(1950, 9.0), rate(1900, 5.0)];
        let txt = render_rate_plot(&rates, 10, 5);
        let expected = concat!(
            "Plot: birth year=[1900, 1976] | mean LH rate (%)=[4.60, 13.40]\n",
            "         o\n",
            "          \n",
            "      o   \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn distribution_plot_draws_both_groups() {
        let estimate = StudyEstimate {
            study_year: 1990,
            ages: vec![20, 40, 60, 80],
            p_lh_given_age: vec![0.13, 0.13, 0.09, 0.05],
            p_age: vec![0.25; 4],
            p_age_given_lh: vec![0.32, 0.32, 0.22, 0.14],
            p_age_given_rh: vec![0.24, 0.24, 0.25, 0.27],
            p_left: 0.1,
            mean_age_left: 46.0,
            mean_age_right: 51.0,
        };
        let txt = render_distribution_plot(&estimate, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        // title + header + 12 rows + legend
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[0], "Study year 1990");
        assert!(lines[1].starts_with("Plot: age=[20, 80]"));
        let body = lines[2..14].concat();
        assert!(body.contains('L') && body.contains('R'));
        assert!(lines[2..14].iter().all(|row| row.chars().count() == 40));
    }

    #[test]
    fn nan_points_are_skipped() {
        let rates = [rate(1976, 13.0), rate(1950, f64::NAN), rate(1900, 5.0)];
        let txt = render_rate_plot(&rates, 10, 5);
        let markers: usize = txt.lines().skip(1).map(|row| row.matches('o').count()).sum();
        assert_eq!(markers, 2);
    }
}
