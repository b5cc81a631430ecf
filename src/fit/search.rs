//! Multi-start guess search for the transcendental families.
//!
//! The search walks the family's guess list in priority order, refining
//! each start with the shared Levenberg–Marquardt driver and keeping the
//! best R². Three rules shape it:
//!
//! - a soft wall-clock budget is checked between guesses (a refinement in
//!   flight is never interrupted)
//! - the walk stops early once a fit crosses `EARLY_STOP_R2`
//! - the search degrades instead of failing: when no guess converges it
//!   falls back to one cheap relaxed refinement of the primary estimate,
//!   and past that returns the raw primary estimate scored R² = 0
//!
//! Only the logarithm can fail here, and only before the search starts:
//! its domain requires every x strictly positive.

use std::time::{Duration, Instant};

use crate::domain::DataPoint;
use crate::error::FitError;
use crate::fit::exact::require_min_count;
use crate::fit::guess::{self, LogGuess};
use crate::fit::refine::{self, RefineSettings};
use crate::math::stats;
use crate::models::{Curve, Transcendental};

/// Default soft budget for one guess search.
pub const DEFAULT_BUDGET_MS: u64 = 2000;
/// Stop searching once a fit explains this much variance.
pub const EARLY_STOP_R2: f64 = 0.999;

/// Soft deadline for a guess search, fixed at construction.
///
/// Carrying the deadline in a value (instead of reading a global clock)
/// keeps the search testable: tests pass [`SearchBudget::unlimited`] for
/// deterministic walks or [`SearchBudget::already_expired`] to exercise
/// the degraded path.
#[derive(Debug, Clone, Copy)]
pub struct SearchBudget {
    deadline: Option<Instant>,
}

impl SearchBudget {
    /// Expire `ms` milliseconds from now.
    pub fn from_millis(ms: u64) -> Self {
        let deadline = Instant::now().checked_add(Duration::from_millis(ms));
        Self { deadline }
    }

    /// Never expires.
    pub fn unlimited() -> Self {
        Self { deadline: None }
    }

    /// Expired from the start; the search skips straight to its fallback.
    pub fn already_expired() -> Self {
        Self {
            deadline: Some(Instant::now()),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Fit one transcendental family by multi-start refinement.
///
/// Returns the fitted curve and its R². Errors only on a wrong point
/// count or, for the logarithm, non-positive x values.
pub fn fit_transcendental(
    family: Transcendental,
    points: &[DataPoint],
    budget: &SearchBudget,
) -> Result<(Curve, f64), FitError> {
    require_min_count(points, 3)?;
    if family == Transcendental::Logarithm {
        if let Some(p) = points.iter().find(|p| p.x <= 0.0) {
            return Err(FitError::NonPositiveDomain { x: p.x });
        }
    }

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

    let guesses = match family {
        Transcendental::Sine => guess::sine_guesses(&xs, &ys),
        Transcendental::Exponential => guess::exponential_guesses(&xs, &ys),
        Transcendental::Logarithm => match guess::logarithm_guesses(&xs, &ys) {
            LogGuess::Degenerate(params) => return Ok((family.curve(params), 0.0)),
            LogGuess::Candidates(list) => list,
        },
    };
    let primary = guesses[0];

    let settings = RefineSettings::for_family(family);
    let mut best: Option<([f64; 4], f64)> = None;
    for start in &guesses {
        if budget.is_expired() {
            break;
        }
        if !family.usable_on(start, &xs) {
            continue;
        }
        let Some(fitted) = refine::refine(family, &xs, &ys, *start, &settings) else {
            continue;
        };
        if let Some(r2) = score(family, &fitted, &xs, &ys) {
            // Strict improvement only, so ties keep the earlier guess.
            if best.as_ref().is_none_or(|(_, held)| r2 > *held) {
                best = Some((fitted, r2));
            }
            if r2 > EARLY_STOP_R2 {
                break;
            }
        }
    }

    if let Some((params, r2)) = best {
        return Ok((family.curve(params), r2));
    }

    // No guess converged. One cheap relaxed attempt from the primary
    // estimate, then the raw estimate itself; the caller always gets a
    // curve back.
    if !budget.is_expired() && family.usable_on(&primary, &xs) {
        if let Some(fitted) = refine::refine(family, &xs, &ys, primary, &RefineSettings::relaxed())
        {
            if let Some(r2) = score(family, &fitted, &xs, &ys) {
                return Ok((family.curve(fitted), r2));
            }
        }
    }
    Ok((family.curve(primary), 0.0))
}

/// R² of the refined parameters, or `None` when they are unusable on this
/// data or score below zero (worse than the mean line).
fn score(family: Transcendental, params: &[f64; 4], xs: &[f64], ys: &[f64]) -> Option<f64> {
    if !family.usable_on(params, xs) {
        return None;
    }
    let predicted: Vec<f64> = xs.iter().map(|&x| family.eval(params, x)).collect();
    let r2 = stats::r_squared(ys, &predicted);
    (r2.is_finite() && r2 >= 0.0).then_some(r2)
}
