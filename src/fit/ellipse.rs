//! Least-squares axis-aligned ellipse fitting.
//!
//! Unlike the transcendental families, the ellipse is not a function of x,
//! so it gets its own Levenberg–Marquardt loop over `(h, k, a, b)` using
//! the algebraic residual
//!
//! ```text
//! r_i = (x_i − h)²/a² + (y_i − k)²/b² − 1
//! ```
//!
//! with an analytic Jacobian. Four seeded initializations cover the common
//! failure shapes (centroid/spread, bounding box, an exact solve of the
//! first four points, an enlarged box); the best candidate by RMS residual
//! wins. Quality is reported as a geometric R²: residual distances to the
//! nearest boundary point against distances to the data centroid, clamped
//! to `[0, 1]`.

use std::f64::consts::{SQRT_2, TAU};

use nalgebra::{DMatrix, DVector};

use crate::domain::DataPoint;
use crate::error::FitError;
use crate::fit::exact;
use crate::fit::search::SearchBudget;
use crate::math::{linsys, stats};
use crate::models::Curve;

/// Semi-axes are clamped to this floor after every update.
pub const MIN_AXIS: f64 = 0.01;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_SHRINK: f64 = 0.3;
const LAMBDA_GROW: f64 = 3.0;
const LAMBDA_FLOOR: f64 = 1e-15;
const LAMBDA_CEIL: f64 = 1e2;
const MAX_ITERATIONS: usize = 300;
/// Converged outright below this squared error.
const SSE_FLOOR: f64 = 1e-14;
/// Converged once an accepted step improves by less than this.
const MIN_REDUCTION: f64 = 1e-12;
/// Boundary-distance sweep resolution for the geometric R².
const DISTANCE_ANGLES: usize = 100;

#[derive(Debug, Clone, Copy)]
struct EllipseParams {
    h: f64,
    k: f64,
    a: f64,
    b: f64,
}

impl EllipseParams {
    fn clamped(self) -> Self {
        Self {
            a: self.a.max(MIN_AXIS),
            b: self.b.max(MIN_AXIS),
            ..self
        }
    }

    fn is_finite(&self) -> bool {
        self.h.is_finite() && self.k.is_finite() && self.a.is_finite() && self.b.is_finite()
    }

    fn residual(&self, p: &DataPoint) -> f64 {
        let dx = p.x - self.h;
        let dy = p.y - self.k;
        dx * dx / (self.a * self.a) + dy * dy / (self.b * self.b) - 1.0
    }
}

/// Fit an axis-aligned ellipse to at least four points.
///
/// Returns the curve and its geometric R². `NoValidFit` means every
/// initialization produced non-finite parameters or error.
pub fn fit_ellipse(points: &[DataPoint], budget: &SearchBudget) -> Result<(Curve, f64), FitError> {
    exact::require_min_count(points, 4)?;

    let mut best: Option<(EllipseParams, f64)> = None;
    for (i, start) in initializations(points).iter().enumerate() {
        // The budget is soft: the first initialization always runs.
        if i > 0 && budget.is_expired() {
            break;
        }
        let Some((params, sse)) = optimize(points, *start) else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, held)| sse < *held) {
            best = Some((params, sse));
        }
    }

    let (params, _) = best.ok_or(FitError::NoValidFit)?;
    let r2 = geometric_r_squared(&params, points);
    let curve = Curve::Ellipse {
        h: params.h,
        k: params.k,
        a: params.a,
        b: params.b,
    };
    Ok((curve, r2))
}

/// Seeded starting points, in priority order.
fn initializations(points: &[DataPoint]) -> Vec<EllipseParams> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let (x_min, x_max) = stats::min_max(&xs);
    let (y_min, y_max) = stats::min_max(&ys);
    let half_x = (x_max - x_min) / 2.0;
    let half_y = (y_max - y_min) / 2.0;

    let mut starts = Vec::with_capacity(4);

    // A uniform ring has coordinate deviation axis/√2, so scale back up.
    starts.push(
        EllipseParams {
            h: stats::mean(&xs),
            k: stats::mean(&ys),
            a: SQRT_2 * stats::std_dev(&xs),
            b: SQRT_2 * stats::std_dev(&ys),
        }
        .clamped(),
    );

    let bbox = EllipseParams {
        h: (x_min + x_max) / 2.0,
        k: (y_min + y_max) / 2.0,
        a: half_x,
        b: half_y,
    }
    .clamped();
    starts.push(bbox);

    if let Ok(Curve::Ellipse { h, k, a, b }) = exact::fit_ellipse_exact(&points[..4]) {
        starts.push(EllipseParams { h, k, a, b }.clamped());
    }

    starts.push(
        EllipseParams {
            a: 1.5 * half_x,
            b: 1.5 * half_y,
            ..bbox
        }
        .clamped(),
    );

    starts.retain(EllipseParams::is_finite);
    starts
}

/// Damped Gauss–Newton from one start. Returns the best parameters found
/// and their squared error, or `None` when nothing finite was reached.
fn optimize(points: &[DataPoint], start: EllipseParams) -> Option<(EllipseParams, f64)> {
    let n = points.len();
    let mut params = start;
    let mut sse = sse_of(points, &params);
    let mut lambda = LAMBDA_INIT;

    for _ in 0..MAX_ITERATIONS {
        if sse < SSE_FLOOR {
            break;
        }

        let mut jac = DMatrix::<f64>::zeros(n, 4);
        let mut res = DVector::<f64>::zeros(n);
        let mut usable = true;
        for (i, p) in points.iter().enumerate() {
            let dx = p.x - params.h;
            let dy = p.y - params.k;
            let a2 = params.a * params.a;
            let b2 = params.b * params.b;
            res[i] = params.residual(p);
            jac[(i, 0)] = -2.0 * dx / a2;
            jac[(i, 1)] = -2.0 * dy / b2;
            jac[(i, 2)] = -2.0 * dx * dx / (a2 * params.a);
            jac[(i, 3)] = -2.0 * dy * dy / (b2 * params.b);
            if !res[i].is_finite() {
                usable = false;
            }
        }
        if !usable || jac.iter().any(|v| !v.is_finite()) {
            break;
        }

        let gradient = jac.transpose() * &res;
        let jtj = jac.transpose() * &jac;
        let mut damped = jtj.clone();
        for j in 0..4 {
            damped[(j, j)] += lambda * jtj[(j, j)].max(1e-12);
        }

        let accepted = linsys::solve_square(&damped, &gradient).and_then(|delta| {
            let candidate = EllipseParams {
                h: params.h - delta[0],
                k: params.k - delta[1],
                a: params.a - delta[2],
                b: params.b - delta[3],
            }
            .clamped();
            let cand_sse = sse_of(points, &candidate);
            (cand_sse.is_finite() && cand_sse < sse).then_some((candidate, cand_sse))
        });

        match accepted {
            Some((candidate, cand_sse)) => {
                let reduction = sse - cand_sse;
                params = candidate;
                sse = cand_sse;
                lambda = (lambda * LAMBDA_SHRINK).max(LAMBDA_FLOOR);
                if reduction < MIN_REDUCTION {
                    break;
                }
            }
            None => {
                lambda *= LAMBDA_GROW;
                if lambda > LAMBDA_CEIL {
                    break;
                }
            }
        }
    }

    (params.is_finite() && sse.is_finite()).then_some((params, sse))
}

fn sse_of(points: &[DataPoint], params: &EllipseParams) -> f64 {
    points.iter().map(|p| params.residual(p).powi(2)).sum()
}

/// Geometric R²: Euclidean distances to the fitted boundary versus
/// distances to the data centroid, clamped to `[0, 1]`.
fn geometric_r_squared(params: &EllipseParams, points: &[DataPoint]) -> f64 {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let cx = stats::mean(&xs);
    let cy = stats::mean(&ys);

    let ss_tot: f64 = points
        .iter()
        .map(|p| (p.x - cx).powi(2) + (p.y - cy).powi(2))
        .sum();
    let ss_res: f64 = points
        .iter()
        .map(|p| boundary_distance(params, p).powi(2))
        .sum();

    if ss_tot < 1e-12 {
        return if ss_res < 1e-12 { 1.0 } else { 0.0 };
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Shortest distance from `p` to the ellipse boundary: a coarse parametric
/// sweep, then a few Newton steps on the squared-distance derivative.
fn boundary_distance(params: &EllipseParams, p: &DataPoint) -> f64 {
    let mut best_t = 0.0;
    let mut best_d2 = f64::INFINITY;
    for i in 0..DISTANCE_ANGLES {
        let t = TAU * i as f64 / DISTANCE_ANGLES as f64;
        let d2 = squared_distance(params, p, t);
        if d2 < best_d2 {
            best_d2 = d2;
            best_t = t;
        }
    }

    let mut t = best_t;
    for _ in 0..5 {
        let (d1, d2) = distance_derivatives(params, p, t);
        if !(d1.is_finite() && d2.is_finite()) || d2.abs() < 1e-12 {
            break;
        }
        t -= d1 / d2;
        let refined = squared_distance(params, p, t);
        if refined.is_finite() && refined < best_d2 {
            best_d2 = refined;
        }
    }
    best_d2.sqrt()
}

fn squared_distance(params: &EllipseParams, p: &DataPoint, t: f64) -> f64 {
    let (sin, cos) = t.sin_cos();
    let ex = params.h + params.a * cos - p.x;
    let ey = params.k + params.b * sin - p.y;
    ex * ex + ey * ey
}

/// First and second derivative of the squared distance with respect to the
/// boundary angle.
fn distance_derivatives(params: &EllipseParams, p: &DataPoint, t: f64) -> (f64, f64) {
    let (sin, cos) = t.sin_cos();
    let ex = params.h + params.a * cos - p.x;
    let ey = params.k + params.b * sin - p.y;
    let dx = -params.a * sin;
    let dy = params.b * cos;
    let d1 = 2.0 * (ex * dx + ey * dy);
    let d2 = 2.0 * (dx * dx + dy * dy - ex * params.a * cos - ey * params.b * sin);
    (d1, d2)
}
