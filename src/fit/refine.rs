//! Shared Levenberg–Marquardt driver for the transcendental families.
//!
//! All three families (`sine`, `logarithm`, `exponential`) share the same
//! four-parameter shape `(a, b, c, d)`, so one damped Gauss–Newton loop
//! covers them:
//!
//! - the Jacobian comes from forward differences (backward when a forward
//!   step leaves the logarithm's domain)
//! - each step solves `(JᵀJ + λ·diag(JᵀJ))·δ = Jᵀr` with the shared
//!   Gaussian elimination routine
//! - a step is accepted only if it lowers the squared error AND the stepped
//!   parameters stay usable (finite everywhere, log domain intact); λ shrinks
//!   on acceptance and grows on rejection
//!
//! The driver never invents validity: if the starting point is unusable it
//! refuses to run, and otherwise it returns the best usable parameters seen,
//! which may be the unchanged start.

use nalgebra::{DMatrix, DVector};

use crate::math::{linsys, stats};
use crate::models::Transcendental;

const LAMBDA_SHRINK: f64 = 0.3;
const LAMBDA_GROW: f64 = 3.0;
const LAMBDA_FLOOR: f64 = 1e-12;
const LAMBDA_CEIL: f64 = 1e10;

/// Per-family knobs for the refinement loop.
#[derive(Debug, Clone, Copy)]
pub struct RefineSettings {
    /// Initial damping. Stiffer families start more damped.
    pub lambda_init: f64,
    pub max_iterations: usize,
    /// Stop once an accepted step improves the squared error by less than
    /// this.
    pub min_reduction: f64,
    /// Stop once the squared error itself falls below this.
    pub sse_floor: f64,
    /// Stop once the gradient's infinity norm falls below this.
    pub grad_tolerance: f64,
}

impl RefineSettings {
    /// Tuned settings for a full-strength refinement.
    pub fn for_family(family: Transcendental) -> Self {
        match family {
            Transcendental::Sine => Self {
                lambda_init: 1e-3,
                max_iterations: 120,
                min_reduction: 1e-12,
                sse_floor: 1e-14,
                grad_tolerance: 1e-10,
            },
            Transcendental::Logarithm => Self {
                lambda_init: 1e-3,
                max_iterations: 80,
                min_reduction: 1e-12,
                sse_floor: 1e-13,
                grad_tolerance: 1e-10,
            },
            // The exponential error surface is stiff along b; start more
            // damped and allow more iterations.
            Transcendental::Exponential => Self {
                lambda_init: 1e-2,
                max_iterations: 150,
                min_reduction: 1e-12,
                sse_floor: 1e-13,
                grad_tolerance: 1e-10,
            },
        }
    }

    /// Cheap, loose settings for the last-resort pass when no regular
    /// guess converged.
    pub fn relaxed() -> Self {
        Self {
            lambda_init: 1e-1,
            max_iterations: 25,
            min_reduction: 1e-6,
            sse_floor: 1e-10,
            grad_tolerance: 1e-6,
        }
    }
}

/// Refine `start` against the observations, minimizing squared error.
///
/// Returns `None` when the start itself is unusable on this data;
/// otherwise the best usable parameters found (possibly `start`).
pub fn refine(
    family: Transcendental,
    xs: &[f64],
    ys: &[f64],
    start: [f64; 4],
    settings: &RefineSettings,
) -> Option<[f64; 4]> {
    if !family.usable_on(&start, xs) {
        return None;
    }

    let n = xs.len();
    let mut params = start;
    let mut sse = sse_of(family, &params, xs, ys);
    let mut lambda = settings.lambda_init;

    for _ in 0..settings.max_iterations {
        let Some(jac) = jacobian(family, &params, xs) else {
            break;
        };
        let residuals = DVector::from_fn(n, |i, _| ys[i] - family.eval(&params, xs[i]));

        let gradient = jac.transpose() * &residuals;
        if gradient.amax() < settings.grad_tolerance {
            break;
        }

        let jtj = jac.transpose() * &jac;
        let mut damped = jtj.clone();
        for j in 0..4 {
            // Floor keeps a flat parameter direction solvable.
            damped[(j, j)] += lambda * jtj[(j, j)].max(1e-12);
        }

        let step = linsys::solve_square(&damped, &gradient);
        let candidate = step.map(|delta| {
            [
                params[0] + delta[0],
                params[1] + delta[1],
                params[2] + delta[2],
                params[3] + delta[3],
            ]
        });

        let improved = candidate.and_then(|cand| {
            if !family.usable_on(&cand, xs) {
                return None;
            }
            let cand_sse = sse_of(family, &cand, xs, ys);
            (cand_sse < sse).then_some((cand, cand_sse))
        });

        match improved {
            Some((cand, new_sse)) => {
                let reduction = sse - new_sse;
                params = cand;
                sse = new_sse;
                lambda = (lambda * LAMBDA_SHRINK).max(LAMBDA_FLOOR);
                if sse < settings.sse_floor || reduction < settings.min_reduction {
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

    Some(params)
}

fn sse_of(family: Transcendental, p: &[f64; 4], xs: &[f64], ys: &[f64]) -> f64 {
    let predicted: Vec<f64> = xs.iter().map(|&x| family.eval(p, x)).collect();
    stats::sum_squared_residuals(ys, &predicted)
}

/// Forward-difference Jacobian of the model values with respect to the
/// four parameters. Falls back to a backward step when the forward one
/// leaves the model's domain; gives up (`None`) when neither side works.
fn jacobian(family: Transcendental, p: &[f64; 4], xs: &[f64]) -> Option<DMatrix<f64>> {
    let n = xs.len();
    let base: Vec<f64> = xs.iter().map(|&x| family.eval(p, x)).collect();
    let mut jac = DMatrix::<f64>::zeros(n, 4);

    for j in 0..4 {
        let h = 1e-7 * p[j].abs().max(1e-3);
        let mut stepped = *p;
        stepped[j] += h;
        let mut used_h = h;
        if !family.usable_on(&stepped, xs) {
            stepped[j] = p[j] - h;
            used_h = -h;
            if !family.usable_on(&stepped, xs) {
                return None;
            }
        }
        for (i, &x) in xs.iter().enumerate() {
            let deriv = (family.eval(&stepped, x) - base[i]) / used_h;
            if !deriv.is_finite() {
                return None;
            }
            jac[(i, j)] = deriv;
        }
    }
    Some(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(family: Transcendental, p: &[f64; 4], xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| family.eval(p, x)).collect()
    }

    #[test]
    fn sine_converges_from_a_nearby_start() {
        let truth = [2.0, 1.5, 0.4, -1.0];
        let xs: Vec<f64> = (0..40).map(|i| i as f64 * 0.25).collect();
        let ys = sample(Transcendental::Sine, &truth, &xs);

        let start = [1.7, 1.4, 0.6, -0.8];
        let settings = RefineSettings::for_family(Transcendental::Sine);
        let fitted = refine(Transcendental::Sine, &xs, &ys, start, &settings).unwrap();

        for (got, want) in fitted.iter().zip(truth.iter()) {
            assert!((got - want).abs() < 1e-4, "fitted {fitted:?}");
        }
    }

    #[test]
    fn exponential_converges_from_a_nearby_start() {
        let truth = [1.5, 0.8, 0.0, 2.0];
        let xs: Vec<f64> = (0..30).map(|i| i as f64 * 0.1 - 1.0).collect();
        let ys = sample(Transcendental::Exponential, &truth, &xs);

        let start = [1.0, 1.0, 0.0, 1.5];
        let settings = RefineSettings::for_family(Transcendental::Exponential);
        let fitted = refine(Transcendental::Exponential, &xs, &ys, start, &settings).unwrap();

        let sse = sse_of(Transcendental::Exponential, &fitted, &xs, &ys);
        assert!(sse < 1e-8, "fitted {fitted:?} with sse {sse}");
    }

    #[test]
    fn logarithm_never_steps_out_of_its_domain() {
        let truth = [2.0, 1.0, 0.5, 1.0];
        let xs: Vec<f64> = (1..30).map(|i| i as f64 * 0.2).collect();
        let ys = sample(Transcendental::Logarithm, &truth, &xs);

        let start = [1.5, 0.9, 0.6, 0.5];
        let settings = RefineSettings::for_family(Transcendental::Logarithm);
        let fitted = refine(Transcendental::Logarithm, &xs, &ys, start, &settings).unwrap();

        assert!(Transcendental::Logarithm.usable_on(&fitted, &xs));
        let sse = sse_of(Transcendental::Logarithm, &fitted, &xs, &ys);
        assert!(sse < 1e-8, "fitted {fitted:?} with sse {sse}");
    }

    #[test]
    fn unusable_start_is_refused() {
        let xs = [0.5, 1.0, 2.0];
        let ys = [1.0, 2.0, 3.0];
        // b·x + c is negative at x = 0.5.
        let start = [1.0, 1.0, -1.0, 0.0];
        let settings = RefineSettings::for_family(Transcendental::Logarithm);
        assert!(refine(Transcendental::Logarithm, &xs, &ys, start, &settings).is_none());
    }

    #[test]
    fn result_is_never_worse_than_the_start() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * (0.7 * x).sin() + 0.2 * x).collect();
        let start = [3.0, 0.7, 0.0, 0.0];
        let settings = RefineSettings::for_family(Transcendental::Sine);
        let fitted = refine(Transcendental::Sine, &xs, &ys, start, &settings).unwrap();

        let before = sse_of(Transcendental::Sine, &start, &xs, &ys);
        let after = sse_of(Transcendental::Sine, &fitted, &xs, &ys);
        assert!(after <= before);
    }
}
