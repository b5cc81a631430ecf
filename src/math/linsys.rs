//! Dense linear system solver.
//!
//! Every solver in this project reduces to a small square system `A·x = b`:
//!
//! - Vandermonde systems for the polynomial families (2×2 to 4×4)
//! - the circle / axis-aligned-ellipse / general-conic systems (3×3 to 5×5)
//! - the 4×4 normal equations inside the Levenberg–Marquardt drivers
//!
//! Implementation choices:
//! - Gaussian elimination with partial pivoting. The systems never exceed
//!   5×5, so elimination beats anything fancier and keeps the failure mode
//!   obvious: a pivot below `PIVOT_EPS` means the geometry is degenerate
//!   (repeated x values, collinear points, and so on).
//! - Callers get `None` on a singular system and decide themselves whether
//!   that is a hard error (exact solvers) or a retry with more damping
//!   (the optimizers).

use nalgebra::{DMatrix, DVector};

/// Pivot magnitudes below this count as zero.
pub const PIVOT_EPS: f64 = 1e-14;

/// Solve the square system `a·x = b` by Gaussian elimination with partial
/// pivoting.
///
/// Returns `None` when a pivot falls below [`PIVOT_EPS`] (singular system)
/// or the solution comes out non-finite.
pub fn solve_square(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    // Augmented copy; the inputs stay untouched.
    let mut m = DMatrix::<f64>::zeros(n, n + 1);
    for i in 0..n {
        for j in 0..n {
            m[(i, j)] = a[(i, j)];
        }
        m[(i, n)] = b[i];
    }

    // Forward elimination.
    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_mag = m[(col, col)].abs();
        for row in (col + 1)..n {
            let mag = m[(row, col)].abs();
            if mag > pivot_mag {
                pivot_mag = mag;
                pivot_row = row;
            }
        }
        if pivot_mag < PIVOT_EPS {
            return None;
        }
        if pivot_row != col {
            m.swap_rows(pivot_row, col);
        }

        for row in (col + 1)..n {
            let factor = m[(row, col)] / m[(col, col)];
            if factor == 0.0 {
                continue;
            }
            for j in col..=n {
                let sub = factor * m[(col, j)];
                m[(row, j)] -= sub;
            }
        }
    }

    // Back substitution.
    let mut x = DVector::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = m[(row, n)];
        for j in (row + 1)..n {
            acc -= m[(row, j)] * x[j];
        }
        x[row] = acc / m[(row, row)];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}
