//! Fitting engine.
//!
//! Layering:
//!
//! - `exact`: closed-form families (polynomials, circle, 4-point ellipse)
//! - `conic`: the five-point general conic with classification
//! - `guess` / `refine` / `search`: the transcendental multi-start pipeline
//! - `ellipse`: the dedicated least-squares ellipse optimizer
//!
//! [`fit`] and [`fit_request`] are the public entry points. They normalize
//! every outcome into a [`FitResult`]: errors land in its `error` field and
//! panics from numeric corner cases are caught at this boundary, so callers
//! never see partial output.

pub mod conic;
pub mod ellipse;
pub mod exact;
pub mod guess;
pub mod refine;
pub mod search;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::domain::{DataPoint, EquationKind, FitRequest, FitResult};
use crate::error::FitError;
use crate::models::{Curve, Transcendental};
use crate::report::equation;

pub use search::{DEFAULT_BUDGET_MS, SearchBudget};

/// Engine-level options for one fit call.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Render near-rational coefficients as fractions.
    pub use_fractions: bool,
    /// Soft budget for the approximation searches. The clock starts when
    /// the budget value is created.
    pub budget: SearchBudget,
}

impl FitOptions {
    pub fn new() -> Self {
        Self {
            use_fractions: false,
            budget: SearchBudget::from_millis(DEFAULT_BUDGET_MS),
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Fit `kind` to `points`, returning the typed curve and, for the
/// approximation families, an R².
pub fn fit_curve(
    kind: EquationKind,
    points: &[DataPoint],
    options: &FitOptions,
) -> Result<(Curve, Option<f64>), FitError> {
    let (curve, r_squared) = match kind {
        EquationKind::Linear => (exact::fit_polynomial(points, 1)?, None),
        EquationKind::Quadratic => (exact::fit_polynomial(points, 2)?, None),
        EquationKind::Cubic => (exact::fit_polynomial(points, 3)?, None),
        EquationKind::Circle => (exact::fit_circle(points)?, None),
        EquationKind::Conic => (conic::fit_conic(points)?, None),
        EquationKind::Ellipse => {
            let (curve, r2) = ellipse::fit_ellipse(points, &options.budget)?;
            (curve, Some(r2))
        }
        EquationKind::Sine => transcendental(Transcendental::Sine, points, options)?,
        EquationKind::Logarithm => transcendental(Transcendental::Logarithm, points, options)?,
        EquationKind::Exponential => transcendental(Transcendental::Exponential, points, options)?,
    };
    if !curve.all_finite() {
        return Err(FitError::InvalidCoefficients);
    }
    Ok((curve, r_squared))
}

fn transcendental(
    family: Transcendental,
    points: &[DataPoint],
    options: &FitOptions,
) -> Result<(Curve, Option<f64>), FitError> {
    let (curve, r2) = search::fit_transcendental(family, points, &options.budget)?;
    Ok((curve, Some(r2)))
}

/// Fit and render the outcome as a [`FitResult`]. Total: failures come
/// back in the result's `error` field, never as a panic.
pub fn fit(kind: EquationKind, points: &[DataPoint], options: &FitOptions) -> FitResult {
    fit_with_curve(kind, points, options).1
}

/// Like [`fit`], but also hands back the typed curve so callers can plot
/// or export the geometry without re-fitting.
pub fn fit_with_curve(
    kind: EquationKind,
    points: &[DataPoint],
    options: &FitOptions,
) -> (Option<Curve>, FitResult) {
    let attempt = catch_unwind(AssertUnwindSafe(|| fit_curve(kind, points, options)));
    match attempt {
        Ok(Ok((curve, r2))) => {
            let result = equation::build_result(kind, &curve, r2, options.use_fractions);
            (Some(curve), result)
        }
        Ok(Err(err)) => (None, FitResult::failure(kind, &err)),
        Err(_) => (None, FitResult::failure(kind, &FitError::NoValidFit)),
    }
}

/// Fit a deserialized request, using the engine default budget when the
/// request does not carry one.
pub fn fit_request(request: &FitRequest) -> FitResult {
    let options = FitOptions {
        use_fractions: request.use_fractions,
        budget: SearchBudget::from_millis(request.budget_ms.unwrap_or(DEFAULT_BUDGET_MS)),
    };
    fit(request.kind, &request.points, &options)
}
