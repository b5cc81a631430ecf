//! Closed-form solvers for the exact families.
//!
//! Each family reduces to one small linear system:
//!
//! - polynomials: a Vandermonde system through degree + 1 points
//! - circle: `x² + y² + Dx + Ey + F = 0` through 3 points
//! - axis-aligned ellipse: `Ax² + By² + Cx + Dy = 1` through 4 points
//!
//! Preconditions are checked in a fixed order (distinctness, then count)
//! so error reporting is deterministic. A singular system is reported as
//! degenerate geometry with a family-specific description.

use nalgebra::{DMatrix, DVector};

use crate::domain::DataPoint;
use crate::error::FitError;
use crate::math::linsys;
use crate::models::Curve;

/// Exact families need exactly `expected` points.
pub fn require_exact_count(points: &[DataPoint], expected: usize) -> Result<(), FitError> {
    if points.len() != expected {
        return Err(FitError::WrongPointCount {
            expected,
            got: points.len(),
            exact: true,
        });
    }
    Ok(())
}

/// Approximation families need at least `minimum` points.
pub fn require_min_count(points: &[DataPoint], minimum: usize) -> Result<(), FitError> {
    if points.len() < minimum {
        return Err(FitError::WrongPointCount {
            expected: minimum,
            got: points.len(),
            exact: false,
        });
    }
    Ok(())
}

/// Reject coincident points, reporting the first offending pair in input
/// order.
pub fn require_distinct(points: &[DataPoint]) -> Result<(), FitError> {
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if points[i].coincides(&points[j]) {
                return Err(FitError::DuplicatePoints {
                    x: points[i].x,
                    y: points[i].y,
                });
            }
        }
    }
    Ok(())
}

/// Interpolating polynomial of the given degree (1 = linear, 2 = quadratic,
/// 3 = cubic) through exactly degree + 1 points.
pub fn fit_polynomial(points: &[DataPoint], degree: usize) -> Result<Curve, FitError> {
    let n = degree + 1;
    require_distinct(points)?;
    require_exact_count(points, n)?;

    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut b = DVector::<f64>::zeros(n);
    for (row, p) in points.iter().enumerate() {
        for (col, power) in (0..n).rev().enumerate() {
            a[(row, col)] = p.x.powi(power as i32);
        }
        b[row] = p.y;
    }

    let sol = linsys::solve_square(&a, &b).ok_or_else(|| {
        FitError::DegenerateGeometry("repeated x values admit no interpolating polynomial".into())
    })?;

    Ok(Curve::Polynomial {
        coeffs: sol.iter().copied().collect(),
    })
}

/// Circle through exactly 3 points.
///
/// Solves `x² + y² + Dx + Ey + F = 0`, then recovers center and radius
/// via `h = −D/2`, `k = −E/2`, `r² = h² + k² − F`.
pub fn fit_circle(points: &[DataPoint]) -> Result<Curve, FitError> {
    require_distinct(points)?;
    require_exact_count(points, 3)?;

    let mut a = DMatrix::<f64>::zeros(3, 3);
    let mut b = DVector::<f64>::zeros(3);
    for (row, p) in points.iter().enumerate() {
        a[(row, 0)] = p.x;
        a[(row, 1)] = p.y;
        a[(row, 2)] = 1.0;
        b[row] = -(p.x * p.x + p.y * p.y);
    }

    // The system determinant is proportional to the triangle's area, so
    // collinear points surface here as a singular system.
    let sol = linsys::solve_square(&a, &b).ok_or_else(|| {
        FitError::DegenerateGeometry("collinear points do not define a circle".into())
    })?;

    let (d, e, f) = (sol[0], sol[1], sol[2]);
    let h = -d / 2.0;
    let k = -e / 2.0;
    let r_sq = h * h + k * k - f;
    if r_sq <= 0.0 {
        return Err(FitError::DegenerateGeometry(
            "circle radius is not positive".into(),
        ));
    }

    Ok(Curve::Circle {
        h,
        k,
        r: r_sq.sqrt(),
    })
}

/// Axis-aligned ellipse through exactly 4 points.
///
/// Solves `Ax² + By² + Cx + Dy = 1` and converts to center/semi-axis form.
/// Requires `A > 0`, `B > 0`, and a positive completed-square constant.
/// The left side is 0 at the origin, so the form only represents ellipses
/// that enclose the origin; points from any other ellipse solve to
/// non-positive quadratic terms and are rejected as degenerate.
pub fn fit_ellipse_exact(points: &[DataPoint]) -> Result<Curve, FitError> {
    require_distinct(points)?;
    require_exact_count(points, 4)?;

    let mut m = DMatrix::<f64>::zeros(4, 4);
    let b = DVector::<f64>::from_element(4, 1.0);
    for (row, p) in points.iter().enumerate() {
        m[(row, 0)] = p.x * p.x;
        m[(row, 1)] = p.y * p.y;
        m[(row, 2)] = p.x;
        m[(row, 3)] = p.y;
    }

    let sol = linsys::solve_square(&m, &b).ok_or_else(|| {
        FitError::DegenerateGeometry("points do not determine an axis-aligned ellipse".into())
    })?;

    ellipse_from_quadratic(sol[0], sol[1], sol[2], sol[3])
}

/// Convert `Ax² + By² + Cx + Dy = 1` into center/semi-axis form.
pub(crate) fn ellipse_from_quadratic(a: f64, b: f64, c: f64, d: f64) -> Result<Curve, FitError> {
    if a <= 0.0 || b <= 0.0 {
        return Err(FitError::DegenerateGeometry(
            "quadratic terms have the wrong sign for an ellipse".into(),
        ));
    }
    let h = -c / (2.0 * a);
    let k = -d / (2.0 * b);
    // Completing the square: A(x−h)² + B(y−k)² = 1 + C²/4A + D²/4B.
    let constant = 1.0 + c * c / (4.0 * a) + d * d / (4.0 * b);
    if constant <= 0.0 {
        return Err(FitError::DegenerateGeometry(
            "completed square has no positive constant term".into(),
        ));
    }
    let semi_a = (constant / a).sqrt();
    let semi_b = (constant / b).sqrt();
    if !(h.is_finite() && k.is_finite() && semi_a.is_finite() && semi_b.is_finite()) {
        return Err(FitError::InvalidCoefficients);
    }
    Ok(Curve::Ellipse {
        h,
        k,
        a: semi_a,
        b: semi_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<DataPoint> {
        raw.iter().map(|&(x, y)| DataPoint::new(x, y)).collect()
    }

    #[test]
    fn linear_through_two_points() {
        let curve = fit_polynomial(&pts(&[(0.0, 1.0), (1.0, 3.0)]), 1).unwrap();
        match curve {
            Curve::Polynomial { coeffs } => {
                assert!((coeffs[0] - 2.0).abs() < 1e-10);
                assert!((coeffs[1] - 1.0).abs() < 1e-10);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn quadratic_reproduces_its_inputs() {
        let input = pts(&[(-1.0, 2.0), (0.0, -1.0), (2.0, 11.0)]);
        let curve = fit_polynomial(&input, 2).unwrap();
        for p in &input {
            assert!((curve.eval(p.x).unwrap() - p.y).abs() < 1e-6);
        }
    }

    #[test]
    fn cubic_recovers_known_coefficients() {
        // y = x^3 - 2x + 1
        let input = pts(&[(-2.0, -3.0), (-1.0, 2.0), (1.0, 0.0), (2.0, 5.0)]);
        let curve = fit_polynomial(&input, 3).unwrap();
        match curve {
            Curve::Polynomial { coeffs } => {
                assert!((coeffs[0] - 1.0).abs() < 1e-8);
                assert!(coeffs[1].abs() < 1e-8);
                assert!((coeffs[2] + 2.0).abs() < 1e-8);
                assert!((coeffs[3] - 1.0).abs() < 1e-8);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn repeated_x_is_degenerate_not_duplicate() {
        let err = fit_polynomial(&pts(&[(1.0, 0.0), (1.0, 5.0)]), 1).unwrap_err();
        assert!(matches!(err, FitError::DegenerateGeometry(_)));
    }

    #[test]
    fn duplicate_point_is_reported_first() {
        // Same point twice; the count is right, distinctness is not.
        let err = fit_polynomial(&pts(&[(1.0, 2.0), (1.0, 2.0)]), 1).unwrap_err();
        assert!(matches!(err, FitError::DuplicatePoints { .. }));
    }

    #[test]
    fn duplicates_are_reported_before_wrong_count() {
        // Doubly invalid: two coincident points where a circle needs three.
        // Distinctness is checked ahead of any per-family requirement.
        let err = fit_circle(&pts(&[(0.0, 0.0), (0.0, 0.0)])).unwrap_err();
        assert!(matches!(err, FitError::DuplicatePoints { .. }));

        // With all points distinct, the count check reports as usual.
        let err = fit_circle(&pts(&[(0.0, 0.0), (1.0, 1.0)])).unwrap_err();
        assert!(matches!(
            err,
            FitError::WrongPointCount {
                expected: 3,
                got: 2,
                exact: true
            }
        ));
    }

    #[test]
    fn unit_circle_through_three_points() {
        let curve = fit_circle(&pts(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)])).unwrap();
        match curve {
            Curve::Circle { h, k, r } => {
                assert!(h.abs() < 1e-10);
                assert!(k.abs() < 1e-10);
                assert!((r - 1.0).abs() < 1e-10);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn offset_circle_through_three_points() {
        // Center (2, -1), radius 5.
        let curve = fit_circle(&pts(&[(7.0, -1.0), (2.0, 4.0), (-3.0, -1.0)])).unwrap();
        match curve {
            Curve::Circle { h, k, r } => {
                assert!((h - 2.0).abs() < 1e-9);
                assert!((k + 1.0).abs() < 1e-9);
                assert!((r - 5.0).abs() < 1e-9);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let err = fit_circle(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])).unwrap_err();
        assert!(matches!(err, FitError::DegenerateGeometry(_)));
    }

    #[test]
    fn axis_aligned_ellipse_through_four_points() {
        // x²/4 + y²/9 = 1
        let curve =
            fit_ellipse_exact(&pts(&[(2.0, 0.0), (-2.0, 0.0), (0.0, 3.0), (0.0, -3.0)])).unwrap();
        match curve {
            Curve::Ellipse { h, k, a, b } => {
                assert!(h.abs() < 1e-9);
                assert!(k.abs() < 1e-9);
                assert!((a - 2.0).abs() < 1e-9);
                assert!((b - 3.0).abs() < 1e-9);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn shifted_ellipse_through_four_points() {
        // (x−0.5)²/4 + (y+0.2)²/1 = 1, which keeps the origin inside.
        let curve =
            fit_ellipse_exact(&pts(&[(2.5, -0.2), (-1.5, -0.2), (0.5, 0.8), (0.5, -1.2)]))
                .unwrap();
        match curve {
            Curve::Ellipse { h, k, a, b } => {
                assert!((h - 0.5).abs() < 1e-9);
                assert!((k + 0.2).abs() < 1e-9);
                assert!((a - 2.0).abs() < 1e-9);
                assert!((b - 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected curve {other:?}"),
        }
    }

    #[test]
    fn ellipse_not_enclosing_origin_is_rejected() {
        // Ax² + By² + Cx + Dy evaluates to 0 < 1 at the origin, so the form
        // only reaches ellipses that enclose it. These points lie on
        // (x−1)²/4 + (y+2)² = 1, which keeps the origin outside; the solved
        // quadratic terms come out negative (A = −1/13, B = −4/13).
        let err = fit_ellipse_exact(&pts(&[(3.0, -2.0), (-1.0, -2.0), (1.0, -1.0), (1.0, -3.0)]))
            .unwrap_err();
        assert!(matches!(err, FitError::DegenerateGeometry(_)));
    }

    #[test]
    fn hyperbola_points_are_rejected_for_ellipse() {
        // Four points of x² − y² = 1 force a negative quadratic term.
        let err = fit_ellipse_exact(&pts(&[
            (1.0, 0.0),
            (-1.0, 0.0),
            (2.0, 3.0_f64.sqrt()),
            (2.0, -(3.0_f64.sqrt())),
        ]))
        .unwrap_err();
        assert!(matches!(err, FitError::DegenerateGeometry(_)));
    }
}
