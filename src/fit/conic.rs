//! General five-point conic solver.
//!
//! Fits `Ax^2 + Bxy + Cy^2 + Dx + Ey + F = 0` through exactly five points by
//! solving the linear system `Ax^2 + Bxy + Cy^2 + Dx + Ey = 1` (pinning
//! `F = -1` up to scale). Raw coordinates make that system badly conditioned,
//! so the solve runs in a normalized frame: points are centered at their
//! centroid and divided by the largest centered coordinate magnitude, and the
//! coefficients are mapped back afterwards.
//!
//! The returned coefficients are rescaled so the largest-magnitude one is 1,
//! which keeps the discriminant-based classification tolerance meaningful.

use nalgebra::{DMatrix, DVector};

use crate::domain::DataPoint;
use crate::error::FitError;
use crate::fit::exact::{require_distinct, require_exact_count};
use crate::math::linsys;
use crate::models::{ConicClass, Curve};

/// Tolerance used when classifying the (renormalized) conic.
pub const CLASSIFY_EPS: f64 = 1e-8;

/// Fit the unique conic section through exactly five distinct points.
pub fn fit_conic(points: &[DataPoint]) -> Result<Curve, FitError> {
    require_distinct(points)?;
    require_exact_count(points, 5)?;

    let mx = points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64;
    let my = points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64;
    let scale = points
        .iter()
        .map(|p| (p.x - mx).abs().max((p.y - my).abs()))
        .fold(0.0_f64, f64::max);
    if scale < 1e-12 {
        return Err(FitError::DegenerateGeometry(
            "points are too close together to determine a conic".into(),
        ));
    }

    let mut m = DMatrix::zeros(5, 5);
    for (row, p) in points.iter().enumerate() {
        let u = (p.x - mx) / scale;
        let v = (p.y - my) / scale;
        m[(row, 0)] = u * u;
        m[(row, 1)] = u * v;
        m[(row, 2)] = v * v;
        m[(row, 3)] = u;
        m[(row, 4)] = v;
    }
    let rhs = DVector::from_element(5, 1.0);
    let sol = linsys::solve_square(&m, &rhs).ok_or_else(|| {
        FitError::DegenerateGeometry("the five points do not determine a unique conic".into())
    })?;

    let coeffs = denormalize([sol[0], sol[1], sol[2], sol[3], sol[4]], mx, my, scale);
    let coeffs = renormalize(coeffs)?;
    let class = classify(&coeffs);
    Ok(Curve::Conic { coeffs, class })
}

/// Map coefficients found in the centered/scaled frame back to raw
/// coordinates. The normalized conic is `A'u^2 + B'uv + C'v^2 + D'u + E'v - 1`
/// with `u = (x - mx)/s`, `v = (y - my)/s`; substituting and collecting terms
/// gives the raw-frame coefficients below.
fn denormalize(prime: [f64; 5], mx: f64, my: f64, scale: f64) -> [f64; 6] {
    let [ap, bp, cp, dp, ep] = prime;
    let inv = 1.0 / scale;
    let inv2 = inv * inv;

    let a = ap * inv2;
    let b = bp * inv2;
    let c = cp * inv2;
    let d = dp * inv - 2.0 * ap * inv2 * mx - bp * inv2 * my;
    let e = ep * inv - bp * inv2 * mx - 2.0 * cp * inv2 * my;
    let f = ap * inv2 * mx * mx + bp * inv2 * mx * my + cp * inv2 * my * my
        - dp * inv * mx
        - ep * inv * my
        - 1.0;
    [a, b, c, d, e, f]
}

/// Rescale so the largest-magnitude coefficient becomes exactly 1.
fn renormalize(coeffs: [f64; 6]) -> Result<[f64; 6], FitError> {
    let mut pivot = 0usize;
    for (i, c) in coeffs.iter().enumerate() {
        if c.abs() > coeffs[pivot].abs() {
            pivot = i;
        }
    }
    let lead = coeffs[pivot];
    if !lead.is_finite() || lead.abs() < 1e-300 {
        return Err(FitError::InvalidCoefficients);
    }
    let mut out = [0.0; 6];
    for (o, c) in out.iter_mut().zip(coeffs.iter()) {
        *o = c / lead;
        if !o.is_finite() {
            return Err(FitError::InvalidCoefficients);
        }
    }
    Ok(out)
}

/// Classify a conic by the sign of the discriminant `B^2 - 4AC`.
fn classify(coeffs: &[f64; 6]) -> ConicClass {
    let [a, b, c, ..] = *coeffs;
    let disc = b * b - 4.0 * a * c;
    if disc.abs() < CLASSIFY_EPS {
        ConicClass::Parabola
    } else if disc > 0.0 {
        ConicClass::Hyperbola
    } else if (a - c).abs() < CLASSIFY_EPS && b.abs() < CLASSIFY_EPS {
        ConicClass::Circle
    } else {
        ConicClass::Ellipse
    }
}
