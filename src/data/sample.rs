//! Seeded demo data generation.
//!
//! Each family has a fixed showcase curve; [`generate`] samples it with
//! Gaussian noise so `cfit demo <family>` exercises the whole pipeline
//! without an input file. Same seed, same points.
//!
//! Placement rules:
//!
//! - exact families sample exactly their required count, at deterministic
//!   positions that keep the solve well-conditioned
//! - approximation families draw positions from the seeded rng
//! - function curves get noise on y only; geometric curves on both
//!   coordinates

use std::f64::consts::TAU;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DataPoint, EquationKind};
use crate::error::AppError;
use crate::models::{ConicClass, Curve};

/// Demo output: sampled points plus the generating truth.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub points: Vec<DataPoint>,
    pub truth: Curve,
}

/// The fixed showcase curve for each family.
pub fn showcase_curve(kind: EquationKind) -> Curve {
    match kind {
        EquationKind::Linear => Curve::Polynomial {
            coeffs: vec![1.5, -2.0],
        },
        EquationKind::Quadratic => Curve::Polynomial {
            coeffs: vec![0.5, -1.0, 3.0],
        },
        EquationKind::Cubic => Curve::Polynomial {
            coeffs: vec![0.3, -1.0, 0.5, 2.0],
        },
        EquationKind::Circle => Curve::Circle {
            h: 1.0,
            k: -2.0,
            r: 4.0,
        },
        EquationKind::Ellipse => Curve::Ellipse {
            h: 2.0,
            k: -1.0,
            a: 5.0,
            b: 3.0,
        },
        // The rectangular hyperbola xy = 4.
        EquationKind::Conic => Curve::Conic {
            coeffs: [0.0, 0.25, 0.0, 0.0, 0.0, -1.0],
            class: ConicClass::Hyperbola,
        },
        EquationKind::Sine => Curve::Sine {
            a: 3.0,
            b: 2.0,
            c: 1.0,
            d: 5.0,
        },
        EquationKind::Logarithm => Curve::Logarithm {
            a: 2.0,
            b: 1.0,
            c: 0.0,
            d: 1.0,
        },
        EquationKind::Exponential => Curve::Exponential {
            a: 2.0,
            b: 0.5,
            c: 0.0,
            d: 1.0,
        },
    }
}

/// Sample the showcase curve for `kind`.
///
/// `count` applies to approximation families and must be at least the
/// family minimum; exact families always sample their required count.
pub fn generate(kind: EquationKind, count: usize, noise: f64, seed: u64) -> Result<DemoData, AppError> {
    if !noise.is_finite() || noise < 0.0 {
        return Err(AppError::new(2, "Noise must be finite and >= 0."));
    }
    let required = kind.required_points();
    let count = if kind.is_exact() {
        required
    } else {
        if count < required {
            return Err(AppError::new(
                2,
                format!(
                    "{} demo needs at least {required} points, got {count}.",
                    kind.display_name()
                ),
            ));
        }
        count
    };

    let truth = showcase_curve(kind);
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut points = Vec::with_capacity(count);
    match kind {
        EquationKind::Linear | EquationKind::Quadratic | EquationKind::Cubic => {
            for i in 0..count {
                let x = -3.0 + 6.0 * i as f64 / (count - 1) as f64;
                let y = eval_truth(&truth, x)?;
                points.push(DataPoint::new(x, y + noise * normal.sample(&mut rng)));
            }
        }
        EquationKind::Circle => {
            for i in 0..count {
                let t = TAU * i as f64 / count as f64;
                let (x, y) = boundary_truth(&truth, t)?;
                points.push(DataPoint::new(
                    x + noise * normal.sample(&mut rng),
                    y + noise * normal.sample(&mut rng),
                ));
            }
        }
        EquationKind::Conic => {
            // Five columns across both hyperbola branches.
            const XS: [f64; 5] = [1.0, 2.0, 4.0, -1.0, -2.0];
            for x in XS {
                let y = 4.0 / x;
                points.push(DataPoint::new(
                    x + noise * normal.sample(&mut rng),
                    y + noise * normal.sample(&mut rng),
                ));
            }
        }
        EquationKind::Ellipse => {
            for _ in 0..count {
                let t = rng.gen_range(0.0..TAU);
                let (x, y) = boundary_truth(&truth, t)?;
                points.push(DataPoint::new(
                    x + noise * normal.sample(&mut rng),
                    y + noise * normal.sample(&mut rng),
                ));
            }
        }
        EquationKind::Sine | EquationKind::Logarithm | EquationKind::Exponential => {
            let (lo, hi) = match kind {
                EquationKind::Sine => (0.0, 6.0),
                EquationKind::Logarithm => (0.5, 10.0),
                _ => (-2.0, 3.0),
            };
            for _ in 0..count {
                let x = rng.gen_range(lo..hi);
                let y = eval_truth(&truth, x)?;
                points.push(DataPoint::new(x, y + noise * normal.sample(&mut rng)));
            }
        }
    }

    Ok(DemoData { points, truth })
}

fn eval_truth(truth: &Curve, x: f64) -> Result<f64, AppError> {
    truth
        .eval(x)
        .ok_or_else(|| AppError::new(4, "Demo truth curve failed to evaluate."))
}

fn boundary_truth(truth: &Curve, t: f64) -> Result<(f64, f64), AppError> {
    truth
        .boundary_point(t)
        .ok_or_else(|| AppError::new(4, "Demo truth curve has no boundary."))
}
