//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DataPoint, EquationKind, FitResult};
use crate::math::stats;
use crate::models::Curve;

/// R² below this gets a caution line in the summary.
const LOW_R_SQUARED: f64 = 0.5;

/// Format the full run summary (dataset stats + fit outcome).
///
/// `curve` is the typed fit when one exists; failures pass `None` and the
/// summary prints the error line instead of equations.
pub fn format_run_summary(points: &[DataPoint], curve: Option<&Curve>, result: &FitResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} fit ===\n", result.kind.display_name()));

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let (x_min, x_max) = stats::min_max(&xs);
    let (y_min, y_max) = stats::min_max(&ys);
    out.push_str(&format!(
        "points  : n={} | x=[{}, {}] | y=[{}, {}]\n",
        points.len(),
        fmt(x_min),
        fmt(x_max),
        fmt(y_min),
        fmt(y_max)
    ));

    if let Some(message) = &result.error {
        out.push_str(&format!("no fit  : {message}\n"));
        return out;
    }

    out.push_str(&format!("equation: {}\n", result.equation));
    if let Some(machine) = &result.machine_equation {
        out.push_str(&format!("grapher : {machine}\n"));
    }
    if let Some(Curve::Conic { class, .. }) = curve {
        out.push_str(&format!("class   : {}\n", class.display_name()));
    }
    if let Some(r2) = result.r_squared {
        out.push_str(&format!("R^2     : {r2:.6}\n"));
        if r2 < LOW_R_SQUARED {
            out.push_str("  (low R^2: this family may not describe these points)\n");
        }
    }

    if !result.coefficients.is_empty() {
        out.push_str("\ncoefficients:\n");
        for (name, value) in &result.coefficients {
            out.push_str(&format!("  {name} = {value:.6}\n"));
        }
    }

    out
}

/// Header block for a demo run: the generating truth before the fit.
pub fn format_demo_header(
    kind: EquationKind,
    truth: &Curve,
    count: usize,
    noise: f64,
    seed: u64,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== demo: {} ===\n", kind.display_name()));
    out.push_str(&format!("truth   : {}\n", super::equation::render(truth, false)));
    out.push_str(&format!(
        "sampled : n={count} | noise sd={} | seed={seed}\n",
        fmt(noise)
    ));
    out
}

fn fmt(v: f64) -> String {
    if v.is_finite() {
        let s = format!("{v:.3}");
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" { "0".to_string() } else { trimmed.to_string() }
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitError;
    use crate::models::ConicClass;
    use crate::report::equation;

    fn sample_points() -> Vec<DataPoint> {
        vec![
            DataPoint::new(0.0, 1.0),
            DataPoint::new(1.0, 3.0),
            DataPoint::new(2.0, 5.0),
        ]
    }

    #[test]
    fn summary_contains_ranges_and_equation() {
        let curve = Curve::Polynomial {
            coeffs: vec![2.0, 1.0],
        };
        let result = equation::build_result(EquationKind::Linear, &curve, None, false);
        let text = format_run_summary(&sample_points(), Some(&curve), &result);
        assert!(text.contains("=== linear fit ==="));
        assert!(text.contains("n=3 | x=[0, 2] | y=[1, 5]"));
        assert!(text.contains("equation: y = 2x + 1"));
        assert!(text.contains("grapher : 2*x + 1"));
        assert!(!text.contains("R^2"));
    }

    #[test]
    fn summary_flags_low_r_squared() {
        let curve = Curve::Sine {
            a: 1.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
        };
        let result = equation::build_result(EquationKind::Sine, &curve, Some(0.12), false);
        let text = format_run_summary(&sample_points(), Some(&curve), &result);
        assert!(text.contains("R^2     : 0.120000"));
        assert!(text.contains("low R^2"));
    }

    #[test]
    fn summary_shows_conic_class() {
        let curve = Curve::Conic {
            coeffs: [0.0, 0.25, 0.0, 0.0, 0.0, -1.0],
            class: ConicClass::Hyperbola,
        };
        let result = equation::build_result(EquationKind::Conic, &curve, None, false);
        let text = format_run_summary(&sample_points(), Some(&curve), &result);
        assert!(text.contains("class   : hyperbola"));
    }

    #[test]
    fn failed_fit_prints_the_error_only() {
        let result = FitResult::failure(
            EquationKind::Circle,
            &FitError::DegenerateGeometry("the three points are collinear".to_string()),
        );
        let text = format_run_summary(&sample_points(), None, &result);
        assert!(text.contains("no fit  : "));
        assert!(text.contains("collinear"));
        assert!(!text.contains("equation:"));
        assert!(!text.contains("coefficients"));
    }

    #[test]
    fn demo_header_shows_the_truth() {
        let truth = Curve::Sine {
            a: 3.0,
            b: 2.0,
            c: 1.0,
            d: 5.0,
        };
        let text = format_demo_header(EquationKind::Sine, &truth, 40, 0.05, 42);
        assert!(text.contains("=== demo: sine ==="));
        assert!(text.contains("truth   : y = 3sin(2x + 1) + 5"));
        assert!(text.contains("n=40 | noise sd=0.05 | seed=42"));
    }
}
