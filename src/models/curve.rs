//! Fitted curve representations.
//!
//! Models are small typed records plus pure evaluation functions, so the
//! fitting and search code can stay generic over the family. The split is:
//!
//! - `Curve`: a finished fit (what the report and export layers consume)
//! - `Transcendental`: the three families refined by the shared
//!   Levenberg–Marquardt driver, all parameterized `(a, b, c, d)`

use serde::{Deserialize, Serialize};

/// Conic classification from the discriminant `B² − 4AC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConicClass {
    Circle,
    Ellipse,
    Parabola,
    Hyperbola,
}

impl ConicClass {
    pub fn display_name(self) -> &'static str {
        match self {
            ConicClass::Circle => "circle",
            ConicClass::Ellipse => "ellipse",
            ConicClass::Parabola => "parabola",
            ConicClass::Hyperbola => "hyperbola",
        }
    }
}

/// A fitted curve with typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Curve {
    /// Coefficients ordered highest power first; length is degree + 1.
    Polynomial { coeffs: Vec<f64> },
    /// Center `(h, k)`, radius `r`.
    Circle { h: f64, k: f64, r: f64 },
    /// Axis-aligned: `(x−h)²/a² + (y−k)²/b² = 1`.
    Ellipse { h: f64, k: f64, a: f64, b: f64 },
    /// `Ax² + Bxy + Cy² + Dx + Ey + F = 0`, scaled so the largest
    /// coefficient has unit magnitude. Coefficient order is `[A..F]`.
    Conic { coeffs: [f64; 6], class: ConicClass },
    /// `y = a·sin(bx + c) + d`
    Sine { a: f64, b: f64, c: f64, d: f64 },
    /// `y = a·ln(bx + c) + d`
    Logarithm { a: f64, b: f64, c: f64, d: f64 },
    /// `y = a·e^(bx + c) + d`
    Exponential { a: f64, b: f64, c: f64, d: f64 },
}

impl Curve {
    /// True for curves that define y as a function of x.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Curve::Polynomial { .. }
                | Curve::Sine { .. }
                | Curve::Logarithm { .. }
                | Curve::Exponential { .. }
        )
    }

    /// Evaluate a function curve at `x`.
    ///
    /// `None` for implicit curves, outside the logarithm's domain, or when
    /// the value is not finite (exponential overflow).
    pub fn eval(&self, x: f64) -> Option<f64> {
        let y = match self {
            Curve::Polynomial { coeffs } => eval_poly(coeffs, x),
            Curve::Sine { a, b, c, d } => a * (b * x + c).sin() + d,
            Curve::Logarithm { a, b, c, d } => {
                let arg = b * x + c;
                if arg <= 0.0 {
                    return None;
                }
                a * arg.ln() + d
            }
            Curve::Exponential { a, b, c, d } => a * (b * x + c).exp() + d,
            Curve::Circle { .. } | Curve::Ellipse { .. } | Curve::Conic { .. } => return None,
        };
        y.is_finite().then_some(y)
    }

    /// Point on the boundary of a circle or ellipse at parametric angle `t`.
    pub fn boundary_point(&self, t: f64) -> Option<(f64, f64)> {
        match self {
            Curve::Circle { h, k, r } => Some((h + r * t.cos(), k + r * t.sin())),
            Curve::Ellipse { h, k, a, b } => Some((h + a * t.cos(), k + b * t.sin())),
            _ => None,
        }
    }

    /// Sample the curve for plotting and export.
    ///
    /// Function curves are sampled on an even x grid over `[x_min, x_max]`,
    /// skipping points where the curve is undefined. Circles and ellipses
    /// are swept parametrically so the whole boundary appears regardless of
    /// the x window. Conics are solved column by column for their y
    /// branches.
    pub fn trace(&self, x_min: f64, x_max: f64, samples: usize) -> Vec<(f64, f64)> {
        if samples < 2 {
            return Vec::new();
        }
        match self {
            Curve::Circle { .. } | Curve::Ellipse { .. } => {
                let step = std::f64::consts::TAU / (samples - 1) as f64;
                (0..samples)
                    .filter_map(|i| self.boundary_point(step * i as f64))
                    .collect()
            }
            Curve::Conic { coeffs, .. } => conic_trace(coeffs, x_min, x_max, samples),
            _ => {
                let step = (x_max - x_min) / (samples - 1) as f64;
                (0..samples)
                    .filter_map(|i| {
                        let x = x_min + step * i as f64;
                        self.eval(x).map(|y| (x, y))
                    })
                    .collect()
            }
        }
    }

    /// Parameter names and values in the report order for the family.
    pub fn named_coefficients(&self) -> Vec<(&'static str, f64)> {
        const POLY_NAMES: [&str; 4] = ["a", "b", "c", "d"];
        const CONIC_NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
        match self {
            Curve::Polynomial { coeffs } => {
                // Highest power gets "a"; degree is at most cubic.
                coeffs
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (POLY_NAMES[i], v))
                    .collect()
            }
            Curve::Circle { h, k, r } => vec![("h", *h), ("k", *k), ("r", *r)],
            Curve::Ellipse { h, k, a, b } => {
                vec![("h", *h), ("k", *k), ("a", *a), ("b", *b)]
            }
            Curve::Conic { coeffs, .. } => coeffs
                .iter()
                .enumerate()
                .map(|(i, &v)| (CONIC_NAMES[i], v))
                .collect(),
            Curve::Sine { a, b, c, d }
            | Curve::Logarithm { a, b, c, d }
            | Curve::Exponential { a, b, c, d } => {
                vec![("a", *a), ("b", *b), ("c", *c), ("d", *d)]
            }
        }
    }

    /// True when every parameter is finite.
    pub fn all_finite(&self) -> bool {
        self.named_coefficients().iter().all(|(_, v)| v.is_finite())
    }
}

/// Evaluate a polynomial with coefficients ordered highest power first.
pub fn eval_poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Solve the conic for y at evenly spaced x columns.
///
/// Each column is a quadratic `C·y² + (B·x + E)·y + (A·x² + D·x + F) = 0`
/// with zero, one, or two real roots. The upper branch is collected left
/// to right and the lower branch right to left, so closed conics come out
/// as one loop.
fn conic_trace(coeffs: &[f64; 6], x_min: f64, x_max: f64, samples: usize) -> Vec<(f64, f64)> {
    let [a, b, c, d, e, f] = *coeffs;
    let step = (x_max - x_min) / (samples - 1) as f64;
    let mut upper = Vec::new();
    let mut lower = Vec::new();
    for i in 0..samples {
        let x = x_min + step * i as f64;
        let qb = b * x + e;
        let qc = a * x * x + d * x + f;
        if c.abs() < 1e-12 {
            // Linear in y for this column.
            if qb.abs() > 1e-12 {
                let y = -qc / qb;
                if y.is_finite() {
                    upper.push((x, y));
                }
            }
            continue;
        }
        let disc = qb * qb - 4.0 * c * qc;
        if disc < 0.0 {
            continue;
        }
        let root = disc.sqrt();
        let y1 = (-qb + root) / (2.0 * c);
        let y2 = (-qb - root) / (2.0 * c);
        let (hi, lo) = if y1 >= y2 { (y1, y2) } else { (y2, y1) };
        if hi.is_finite() {
            upper.push((x, hi));
        }
        if disc > 0.0 && lo.is_finite() {
            lower.push((x, lo));
        }
    }
    lower.reverse();
    upper.extend(lower);
    upper
}

/// The three families refined by the shared LM driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transcendental {
    Sine,
    Logarithm,
    Exponential,
}

impl Transcendental {
    /// Raw model value at `x` (may be non-finite; callers validate).
    pub fn eval(self, p: &[f64; 4], x: f64) -> f64 {
        let [a, b, c, d] = *p;
        match self {
            Transcendental::Sine => a * (b * x + c).sin() + d,
            Transcendental::Logarithm => a * (b * x + c).ln() + d,
            Transcendental::Exponential => a * (b * x + c).exp() + d,
        }
    }

    /// Structural domain check: the logarithm needs `b·x + c > 0` at every
    /// sample; the other families have no constraint.
    pub fn domain_ok(self, p: &[f64; 4], xs: &[f64]) -> bool {
        match self {
            Transcendental::Logarithm => xs.iter().all(|&x| p[1] * x + p[2] > 0.0),
            Transcendental::Sine | Transcendental::Exponential => true,
        }
    }

    /// True when the model evaluates to a finite value at every sample.
    /// Catches exponential overflow and domain violations in one place.
    pub fn usable_on(self, p: &[f64; 4], xs: &[f64]) -> bool {
        p.iter().all(|v| v.is_finite())
            && self.domain_ok(p, xs)
            && xs.iter().all(|&x| self.eval(p, x).is_finite())
    }

    pub fn curve(self, p: [f64; 4]) -> Curve {
        let [a, b, c, d] = p;
        match self {
            Transcendental::Sine => Curve::Sine { a, b, c, d },
            Transcendental::Logarithm => Curve::Logarithm { a, b, c, d },
            Transcendental::Exponential => Curve::Exponential { a, b, c, d },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poly_eval_is_horner() {
        // 2x^2 - 3x + 1 at x = 2 is 3
        assert!((eval_poly(&[2.0, -3.0, 1.0], 2.0) - 3.0).abs() < 1e-12);
        assert!((eval_poly(&[5.0], 100.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn logarithm_eval_respects_domain() {
        let curve = Curve::Logarithm {
            a: 1.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
        };
        assert!(curve.eval(-1.0).is_none());
        assert!(curve.eval(0.0).is_none());
        assert!((curve.eval(1.0).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn exponential_overflow_is_not_a_value() {
        let curve = Curve::Exponential {
            a: 1.0,
            b: 1000.0,
            c: 0.0,
            d: 0.0,
        };
        assert!(curve.eval(10.0).is_none());
    }

    #[test]
    fn implicit_curves_do_not_evaluate_as_functions() {
        let circle = Curve::Circle {
            h: 0.0,
            k: 0.0,
            r: 1.0,
        };
        assert!(!circle.is_function());
        assert!(circle.eval(0.5).is_none());
        let (x, y) = circle.boundary_point(0.0).unwrap();
        assert!((x - 1.0).abs() < 1e-12 && y.abs() < 1e-12);
    }

    #[test]
    fn transcendental_usability_filters_log_domain() {
        let xs = [0.5, 1.0, 2.0];
        let log = Transcendental::Logarithm;
        assert!(log.usable_on(&[1.0, 1.0, 0.0, 0.0], &xs));
        // c = -1 makes b·x + c non-positive at x = 0.5 and x = 1.
        assert!(!log.usable_on(&[1.0, 1.0, -1.0, 0.0], &xs));
    }

    #[test]
    fn circle_trace_stays_on_the_boundary_and_closes() {
        let circle = Curve::Circle {
            h: 2.0,
            k: -1.0,
            r: 3.0,
        };
        let pts = circle.trace(0.0, 1.0, 64);
        assert_eq!(pts.len(), 64);
        for (x, y) in &pts {
            let dist = ((x - 2.0).powi(2) + (y + 1.0).powi(2)).sqrt();
            assert!((dist - 3.0).abs() < 1e-9);
        }
        let (fx, fy) = pts[0];
        let (lx, ly) = pts[pts.len() - 1];
        assert!((fx - lx).abs() < 1e-9 && (fy - ly).abs() < 1e-9);
    }

    #[test]
    fn conic_trace_satisfies_the_equation() {
        // Unit circle as a general conic.
        let conic = Curve::Conic {
            coeffs: [1.0, 0.0, 1.0, 0.0, 0.0, -1.0],
            class: ConicClass::Circle,
        };
        let pts = conic.trace(-1.0, 1.0, 41);
        assert!(pts.len() > 40, "expected both branches, got {}", pts.len());
        for (x, y) in &pts {
            assert!((x * x + y * y - 1.0).abs() < 1e-9, "({x}, {y}) off curve");
        }
    }

    #[test]
    fn function_trace_skips_domain_holes() {
        let log = Curve::Logarithm {
            a: 1.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
        };
        let pts = log.trace(-1.0, 3.0, 21);
        assert!(!pts.is_empty());
        assert!(pts.iter().all(|(x, _)| *x > 0.0));
    }

    #[test]
    fn named_coefficients_follow_family_order() {
        let circle = Curve::Circle {
            h: 1.0,
            k: 2.0,
            r: 3.0,
        };
        let names: Vec<&str> = circle.named_coefficients().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["h", "k", "r"]);

        let quad = Curve::Polynomial {
            coeffs: vec![1.0, 2.0, 3.0],
        };
        let names: Vec<&str> = quad.named_coefficients().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
