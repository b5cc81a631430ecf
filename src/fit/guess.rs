//! Initial parameter estimates for the transcendental families.
//!
//! Levenberg–Marquardt only finds the basin it starts in, so each family
//! gets a priority-ordered guess list: a data-driven primary estimate
//! first (linearized least squares where the family allows it), then
//! systematic variations of amplitude, rate, phase, and offset for the
//! search to walk. Non-finite guesses are filtered out at the source so
//! the search never sees them.

use std::f64::consts::{FRAC_PI_4, PI};

use crate::math::stats;

/// Amplitude multipliers tried after the primary sine estimate.
const SINE_AMPLITUDE_SCALES: [f64; 4] = [0.5, 1.2, 1.5, 2.0];
/// Frequency multipliers tried after the primary sine estimate.
const SINE_FREQUENCY_SCALES: [f64; 4] = [0.5, 1.5, 2.0, 3.0];

/// Priority-ordered starts for `y = a·sin(bx + c) + d`.
pub fn sine_guesses(xs: &[f64], ys: &[f64]) -> Vec<[f64; 4]> {
    let d = stats::mean(ys);
    let (y_min, y_max) = stats::min_max(ys);
    let a = (y_max - y_min) / 2.0;
    let (x_min, x_max) = stats::min_max(xs);
    let x_range = x_max - x_min;

    // Assume roughly two cycles across the data, then trust the count of
    // mean-level crossings once there are enough to be informative (each
    // full cycle crosses the mean twice).
    let mut b = if x_range > 0.0 { 4.0 * PI / x_range } else { 1.0 };
    let crossings = mean_crossings(xs, ys, d);
    if crossings > 2 && x_range > 0.0 {
        b = PI * crossings as f64 / x_range;
    }

    let c = best_phase(xs, ys, a, b, d);

    let mut out = vec![[a, b, c, d]];
    for scale in SINE_AMPLITUDE_SCALES {
        out.push([a * scale, b, c, d]);
    }
    for scale in SINE_FREQUENCY_SCALES {
        out.push([a, b * scale, c, d]);
    }
    for step in 1..8 {
        out.push([a, b, c + step as f64 * FRAC_PI_4, d]);
    }
    // Mirrored form of the primary estimate.
    out.push([-a, b, c + PI, d]);
    // Offset alternatives: midrange instead of mean, and none at all.
    out.push([a, b, c, (y_min + y_max) / 2.0]);
    out.push([a, b, c, 0.0]);

    sanitize(&mut out);
    out
}

/// Starts for `y = a·ln(bx + c) + d`. Callers guarantee every x > 0.
pub enum LogGuess {
    /// x carries no usable spread; skip the search and report this curve
    /// directly with an R² of zero.
    Degenerate([f64; 4]),
    /// Priority-ordered candidate starts.
    Candidates(Vec<[f64; 4]>),
}

pub fn logarithm_guesses(xs: &[f64], ys: &[f64]) -> LogGuess {
    let ln_xs: Vec<f64> = xs.iter().map(|x| x.ln()).collect();
    let Some((slope, intercept)) = linear_regression(&ln_xs, ys) else {
        return LogGuess::Degenerate([1.0, 1.0, 0.0, stats::mean(ys)]);
    };

    let x_min = stats::min_max(xs).0;
    let mut out = vec![[slope, 1.0, 0.0, intercept]];
    for b in [0.5, 2.0, 5.0] {
        out.push([slope, b, 0.0, intercept]);
    }
    // Positive c offsets keep b·x + c inside the domain for x > 0.
    for fraction in [0.1, 0.5] {
        out.push([slope, 1.0, fraction * x_min, intercept]);
    }

    sanitize(&mut out);
    LogGuess::Candidates(out)
}

/// Priority-ordered starts for `y = a·e^(bx + c) + d`.
pub fn exponential_guesses(xs: &[f64], ys: &[f64]) -> Vec<[f64; 4]> {
    let (y_min, y_max) = stats::min_max(ys);
    let spread = if y_max - y_min > 0.0 { y_max - y_min } else { 1.0 };
    let mut out = Vec::new();

    // Log-linearization: ln y against x, valid only while every y > 0.
    if ys.iter().all(|&y| y > 0.0) {
        let ln_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
        if let Some((slope, intercept)) = linear_regression(xs, &ln_ys) {
            out.push([intercept.exp(), slope, 0.0, 0.0]);
        }
    }

    // Same linearization with a baseline just under the minimum, which
    // captures curves flattening toward a positive offset.
    let baseline = 0.9 * y_min;
    let shifted: Vec<f64> = ys.iter().map(|y| y - baseline).collect();
    if shifted.iter().all(|&y| y > 0.0) {
        let ln_shifted: Vec<f64> = shifted.iter().map(|y| y.ln()).collect();
        if let Some((slope, intercept)) = linear_regression(xs, &ln_shifted) {
            out.push([intercept.exp(), slope, 0.0, baseline]);
        }
    }

    // Shape heuristics keyed to the data's vertical extent.
    for b in [1.0, -1.0, 2.0, 0.5, -0.5] {
        out.push([spread, b, 0.0, y_min]);
    }
    out.push([1.0, 1.0, 0.0, 0.0]);
    out.push([1.0, -1.0, 0.0, 0.0]);

    sanitize(&mut out);
    out
}

/// Drop non-finite guesses; keep at least one neutral start so the search
/// always has a primary.
fn sanitize(guesses: &mut Vec<[f64; 4]>) {
    guesses.retain(|g| g.iter().all(|v| v.is_finite()));
    if guesses.is_empty() {
        guesses.push([1.0, 1.0, 0.0, 0.0]);
    }
}

/// Count sign changes of `y - level` between x-adjacent points.
fn mean_crossings(xs: &[f64], ys: &[f64], level: f64) -> usize {
    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&i, &j| xs[i].partial_cmp(&xs[j]).unwrap_or(std::cmp::Ordering::Equal));
    order
        .windows(2)
        .filter(|w| (ys[w[0]] - level) * (ys[w[1]] - level) < 0.0)
        .count()
}

/// Brute-force phase scan: π/16 steps over [0, 2π) with the other three
/// parameters held fixed; earliest winner on ties.
fn best_phase(xs: &[f64], ys: &[f64], a: f64, b: f64, d: f64) -> f64 {
    let mut best_c = 0.0;
    let mut best_sse = f64::INFINITY;
    for step in 0..32 {
        let c = step as f64 * PI / 16.0;
        let sse: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let e = y - (a * (b * x + c).sin() + d);
                e * e
            })
            .sum();
        if sse < best_sse {
            best_sse = sse;
            best_c = c;
        }
    }
    best_c
}

/// Least-squares line `y = slope·x + intercept`; `None` when x has no
/// usable variance or the sums are not finite.
fn linear_regression(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let mx = stats::mean(xs);
    let my = stats::mean(ys);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
    }
    if !(sxx.is_finite() && sxy.is_finite()) || sxx < 1e-12 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}
