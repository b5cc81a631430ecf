//! Equation rendering.
//!
//! Turns a fitted [`Curve`] into the strings users see:
//!
//! - a human-readable equation (`y = 2x^2 - 3x + 1`)
//! - a plain-ASCII machine form for pasting into an external grapher
//!
//! Formatting rules shared by every family:
//!
//! - coefficients print with six decimals, trailing zeros trimmed
//! - terms whose coefficient rounds to zero are dropped; a fully empty
//!   side renders as `0`
//! - unit coefficients are elided (`x^2`, not `1x^2`)
//! - fraction mode replaces values matching a small rational with `p/q`

use crate::domain::{EquationKind, FitResult};
use crate::error::FitError;
use crate::models::Curve;

/// Largest denominator considered when matching a coefficient to a
/// fraction.
const MAX_DENOMINATOR: i64 = 1000;

/// Relative tolerance for accepting a fraction match.
const FRACTION_TOLERANCE: f64 = 1e-9;

/// Human-readable equation for a fitted curve.
pub fn render(curve: &Curve, use_fractions: bool) -> String {
    match curve {
        Curve::Polynomial { coeffs } => {
            format!("y = {}", polynomial_terms(coeffs, use_fractions, false))
        }
        Curve::Circle { h, k, r } => format!(
            "{} + {} = {}",
            shifted_square('x', *h, use_fractions),
            shifted_square('y', *k, use_fractions),
            fmt_value(r * r, use_fractions),
        ),
        Curve::Ellipse { h, k, a, b } => format!(
            "{} + {} = 1",
            axis_term('x', *h, *a, use_fractions),
            axis_term('y', *k, *b, use_fractions),
        ),
        Curve::Conic { coeffs, .. } => conic_expr(coeffs, use_fractions, false),
        Curve::Sine { a, b, c, d } => format!(
            "y = {}",
            transcendental_expr(*a, *b, *c, *d, |inner| format!("sin({inner})"), use_fractions, false),
        ),
        Curve::Logarithm { a, b, c, d } => format!(
            "y = {}",
            transcendental_expr(*a, *b, *c, *d, |inner| format!("ln({inner})"), use_fractions, false),
        ),
        Curve::Exponential { a, b, c, d } => format!(
            "y = {}",
            transcendental_expr(*a, *b, *c, *d, |inner| format!("e^({inner})"), use_fractions, false),
        ),
    }
}

/// Grapher-friendly form: function families render as a bare expression,
/// implicit families as a full equation. Products are always starred and
/// fractions never used.
pub fn render_machine(curve: &Curve) -> String {
    match curve {
        Curve::Polynomial { coeffs } => polynomial_terms(coeffs, false, true),
        Curve::Sine { a, b, c, d } => {
            transcendental_expr(*a, *b, *c, *d, |inner| format!("sin({inner})"), false, true)
        }
        Curve::Logarithm { a, b, c, d } => {
            transcendental_expr(*a, *b, *c, *d, |inner| format!("ln({inner})"), false, true)
        }
        Curve::Exponential { a, b, c, d } => {
            transcendental_expr(*a, *b, *c, *d, |inner| format!("exp({inner})"), false, true)
        }
        Curve::Conic { coeffs, .. } => conic_expr(coeffs, false, true),
        // No coefficient-symbol products on these, so the human form is
        // already machine-safe.
        Curve::Circle { .. } | Curve::Ellipse { .. } => render(curve, false),
    }
}

/// Assemble the [`FitResult`] for a fitted curve. A curve carrying any
/// non-finite parameter becomes an `InvalidCoefficients` failure instead.
pub fn build_result(
    kind: EquationKind,
    curve: &Curve,
    r_squared: Option<f64>,
    use_fractions: bool,
) -> FitResult {
    if !curve.all_finite() {
        return FitResult::failure(kind, &FitError::InvalidCoefficients);
    }
    let coefficients = curve
        .named_coefficients()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    FitResult {
        kind,
        coefficients,
        equation: render(curve, use_fractions),
        machine_equation: Some(render_machine(curve)),
        r_squared,
        error: None,
    }
}

/// Incremental ` + ` / ` - ` joiner for equation terms.
struct Terms {
    out: String,
}

impl Terms {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn push(&mut self, negative: bool, body: String) {
        if self.out.is_empty() {
            if negative {
                self.out.push('-');
            }
        } else {
            self.out.push_str(if negative { " - " } else { " + " });
        }
        self.out.push_str(&body);
    }

    fn finish(self) -> String {
        if self.out.is_empty() {
            "0".to_string()
        } else {
            self.out
        }
    }
}

/// Format a coefficient magnitude.
///
/// Fraction mode first tries a small-rational match; otherwise (and as the
/// fallback) six decimal places with trailing zeros trimmed.
fn fmt_value(v: f64, use_fractions: bool) -> String {
    if use_fractions {
        if let Some((numerator, denominator)) = small_fraction(v) {
            if denominator == 1 {
                return format!("{numerator}");
            }
            return format!("{numerator}/{denominator}");
        }
    }
    let formatted = format!("{v:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Match `v` against a fraction with denominator at most
/// [`MAX_DENOMINATOR`], via continued-fraction convergents.
fn small_fraction(v: f64) -> Option<(i64, i64)> {
    if !v.is_finite() {
        return None;
    }
    let tolerance = FRACTION_TOLERANCE * v.abs().max(1.0);
    let target = v.abs();
    let mut x = target;
    let (mut p_prev2, mut q_prev2) = (0i64, 1i64);
    let (mut p_prev, mut q_prev) = (1i64, 0i64);
    for _ in 0..64 {
        let whole = x.floor();
        if whole > i64::MAX as f64 {
            return None;
        }
        let a = whole as i64;
        let p = a.checked_mul(p_prev)?.checked_add(p_prev2)?;
        let q = a.checked_mul(q_prev)?.checked_add(q_prev2)?;
        if q > MAX_DENOMINATOR {
            return None;
        }
        if q > 0 && (target - p as f64 / q as f64).abs() <= tolerance {
            return Some((if v < 0.0 { -p } else { p }, q));
        }
        (p_prev2, q_prev2) = (p_prev, q_prev);
        (p_prev, q_prev) = (p, q);
        let fractional = x - whole;
        if fractional < 1e-15 {
            return None;
        }
        x = 1.0 / fractional;
    }
    None
}

/// Attach a formatted coefficient to a symbol, eliding `1` and starring
/// the product in machine mode. Fraction coefficients get parentheses so
/// `(3/4)x` cannot read as `3/(4x)`.
fn scaled_symbol(coeff: &str, symbol: &str, machine: bool) -> String {
    if coeff == "1" {
        return symbol.to_string();
    }
    let coeff = if coeff.contains('/') {
        format!("({coeff})")
    } else {
        coeff.to_string()
    };
    if machine {
        format!("{coeff}*{symbol}")
    } else {
        format!("{coeff}{symbol}")
    }
}

/// Sum of `c·x^k` terms, highest power first.
fn polynomial_terms(coeffs: &[f64], use_fractions: bool, machine: bool) -> String {
    let degree = coeffs.len().saturating_sub(1);
    let mut terms = Terms::new();
    for (i, &c) in coeffs.iter().enumerate() {
        let magnitude = fmt_value(c.abs(), use_fractions);
        if magnitude == "0" {
            continue;
        }
        let power = degree - i;
        let body = match power {
            0 => magnitude,
            1 => scaled_symbol(&magnitude, "x", machine),
            _ => scaled_symbol(&magnitude, &format!("x^{power}"), machine),
        };
        terms.push(c < 0.0, body);
    }
    terms.finish()
}

/// The inner `b·x + c` argument of the transcendental families.
fn linear_expr(b: f64, c: f64, use_fractions: bool, machine: bool) -> String {
    let mut terms = Terms::new();
    let slope = fmt_value(b.abs(), use_fractions);
    if slope != "0" {
        terms.push(b < 0.0, scaled_symbol(&slope, "x", machine));
    }
    let offset = fmt_value(c.abs(), use_fractions);
    if offset != "0" {
        terms.push(c < 0.0, offset);
    }
    terms.finish()
}

/// `a·wrap(b·x + c) + d` with zero terms dropped.
fn transcendental_expr(
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    wrap: impl Fn(&str) -> String,
    use_fractions: bool,
    machine: bool,
) -> String {
    let mut terms = Terms::new();
    let amplitude = fmt_value(a.abs(), use_fractions);
    if amplitude != "0" {
        let inner = linear_expr(b, c, use_fractions, machine);
        terms.push(a < 0.0, scaled_symbol(&amplitude, &wrap(&inner), machine));
    }
    let offset = fmt_value(d.abs(), use_fractions);
    if offset != "0" {
        terms.push(d < 0.0, offset);
    }
    terms.finish()
}

/// `(x − h)²` as `(x - 2)^2`, `(x + 1)^2`, or plain `x^2` for a zero
/// center.
fn shifted_square(symbol: char, center: f64, use_fractions: bool) -> String {
    let offset = fmt_value(center.abs(), use_fractions);
    if offset == "0" {
        return format!("{symbol}^2");
    }
    let sign = if center < 0.0 { '+' } else { '-' };
    format!("({symbol} {sign} {offset})^2")
}

/// One ellipse term `(x − h)²/a²`, eliding a unit denominator.
fn axis_term(symbol: char, center: f64, semi_axis: f64, use_fractions: bool) -> String {
    let numerator = shifted_square(symbol, center, use_fractions);
    let denominator = fmt_value(semi_axis * semi_axis, use_fractions);
    if denominator == "1" {
        numerator
    } else {
        format!("{numerator}/{denominator}")
    }
}

/// `Ax² + Bxy + Cy² + Dx + Ey + F = 0` with zero terms dropped.
fn conic_expr(coeffs: &[f64; 6], use_fractions: bool, machine: bool) -> String {
    let [a, b, c, d, e, f] = *coeffs;
    let xy = if machine { "x*y" } else { "xy" };
    let named: [(f64, Option<&str>); 6] = [
        (a, Some("x^2")),
        (b, Some(xy)),
        (c, Some("y^2")),
        (d, Some("x")),
        (e, Some("y")),
        (f, None),
    ];
    let mut terms = Terms::new();
    for (coeff, symbol) in named {
        let magnitude = fmt_value(coeff.abs(), use_fractions);
        if magnitude == "0" {
            continue;
        }
        let body = match symbol {
            Some(sym) => scaled_symbol(&magnitude, sym, machine),
            None => magnitude,
        };
        terms.push(coeff < 0.0, body);
    }
    format!("{} = 0", terms.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConicClass;

    fn poly(coeffs: &[f64]) -> Curve {
        Curve::Polynomial {
            coeffs: coeffs.to_vec(),
        }
    }

    #[test]
    fn linear_with_and_without_fractions() {
        let curve = poly(&[0.75, -2.0]);
        assert_eq!(render(&curve, false), "y = 0.75x - 2");
        assert_eq!(render(&curve, true), "y = (3/4)x - 2");
    }

    #[test]
    fn polynomial_golden_forms() {
        assert_eq!(render(&poly(&[2.0, -3.0, 1.0]), false), "y = 2x^2 - 3x + 1");
        assert_eq!(render(&poly(&[1.0, 0.0, -4.0]), false), "y = x^2 - 4");
        assert_eq!(render(&poly(&[-1.0, 0.0, 0.0, 0.0]), false), "y = -x^3");
        assert_eq!(render(&poly(&[0.0, 0.0]), false), "y = 0");
    }

    #[test]
    fn polynomial_machine_form_stars_products() {
        assert_eq!(
            render_machine(&poly(&[2.0, -3.0, 1.0])),
            "2*x^2 - 3*x + 1"
        );
        assert_eq!(render_machine(&poly(&[1.0, 0.0, -4.0])), "x^2 - 4");
    }

    #[test]
    fn circle_golden_forms() {
        let circle = Curve::Circle {
            h: 2.0,
            k: -1.0,
            r: 5.0,
        };
        assert_eq!(render(&circle, false), "(x - 2)^2 + (y + 1)^2 = 25");
        let origin = Curve::Circle {
            h: 0.0,
            k: 0.0,
            r: 3.0,
        };
        assert_eq!(render(&origin, false), "x^2 + y^2 = 9");
    }

    #[test]
    fn ellipse_elides_unit_denominators() {
        let ellipse = Curve::Ellipse {
            h: 1.0,
            k: -2.0,
            a: 2.0,
            b: 3.0,
        };
        assert_eq!(render(&ellipse, false), "(x - 1)^2/4 + (y + 2)^2/9 = 1");
        let unit = Curve::Ellipse {
            h: 0.0,
            k: 0.0,
            a: 2.0,
            b: 1.0,
        };
        assert_eq!(render(&unit, false), "x^2/4 + y^2 = 1");
    }

    #[test]
    fn sine_human_and_machine() {
        let sine = Curve::Sine {
            a: 3.0,
            b: 2.0,
            c: 1.0,
            d: 5.0,
        };
        assert_eq!(render(&sine, false), "y = 3sin(2x + 1) + 5");
        assert_eq!(render_machine(&sine), "3*sin(2*x + 1) + 5");
    }

    #[test]
    fn logarithm_drops_zero_terms() {
        let log = Curve::Logarithm {
            a: 2.0,
            b: 1.0,
            c: 1.0,
            d: -3.0,
        };
        assert_eq!(render(&log, false), "y = 2ln(x + 1) - 3");
        let bare = Curve::Logarithm {
            a: 1.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
        };
        assert_eq!(render(&bare, false), "y = ln(x)");
    }

    #[test]
    fn exponential_machine_form_uses_exp() {
        let exp = Curve::Exponential {
            a: 2.0,
            b: 0.5,
            c: 0.0,
            d: 1.0,
        };
        assert_eq!(render(&exp, false), "y = 2e^(0.5x) + 1");
        assert_eq!(render_machine(&exp), "2*exp(0.5*x) + 1");
    }

    #[test]
    fn conic_renders_cross_term_and_trailing_zero_side() {
        let conic = Curve::Conic {
            coeffs: [0.0, 0.25, 0.0, 0.0, 0.0, -1.0],
            class: ConicClass::Hyperbola,
        };
        assert_eq!(render(&conic, false), "0.25xy - 1 = 0");
        assert_eq!(render(&conic, true), "(1/4)xy - 1 = 0");
        assert_eq!(render_machine(&conic), "0.25*x*y - 1 = 0");
    }

    #[test]
    fn fraction_matching_is_tight() {
        assert_eq!(small_fraction(0.75), Some((3, 4)));
        assert_eq!(small_fraction(-0.75), Some((-3, 4)));
        assert_eq!(small_fraction(1.0 / 3.0), Some((1, 3)));
        assert_eq!(small_fraction(2.0), Some((2, 1)));
        // Six decimals of 1/3 is not 1/3 within tolerance.
        assert_eq!(small_fraction(0.333333), None);
        assert_eq!(small_fraction(std::f64::consts::PI), None);
        assert_eq!(small_fraction(f64::NAN), None);
    }

    #[test]
    fn values_trim_trailing_zeros() {
        assert_eq!(fmt_value(2.5, false), "2.5");
        assert_eq!(fmt_value(2.0, false), "2");
        assert_eq!(fmt_value(-0.0000001, false), "0");
        assert_eq!(fmt_value(0.1234567, false), "0.123457");
    }

    #[test]
    fn build_result_rejects_non_finite_curves() {
        let bad = Curve::Circle {
            h: f64::NAN,
            k: 0.0,
            r: 1.0,
        };
        let result = build_result(EquationKind::Circle, &bad, None, false);
        assert!(result.is_error());

        let good = Curve::Circle {
            h: 0.0,
            k: 0.0,
            r: 2.0,
        };
        let result = build_result(EquationKind::Circle, &good, None, false);
        assert!(!result.is_error());
        assert_eq!(result.equation, "x^2 + y^2 = 4");
        assert_eq!(result.coefficients.len(), 3);
        assert_eq!(result.coefficients.get("r"), Some(&2.0));
    }
}
