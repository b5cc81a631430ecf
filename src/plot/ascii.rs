//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size grid) and deterministic, for quick
//! visual sanity checks and golden tests:
//!
//! - observed points: `o`
//! - fitted curve: `-`
//!
//! The window frames the data. Bounded shapes (circle, ellipse) widen it
//! so the whole boundary is visible; curve samples outside the window lift
//! the pen, so hyperbola branches are never joined across the gap.

use crate::domain::DataPoint;
use crate::math::stats;
use crate::models::Curve;

/// Render the scatter plus an optional fitted-curve overlay.
pub fn render_plot(points: &[DataPoint], curve: Option<&Curve>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (mut x_min, mut x_max) = x_window(points);

    // A circle or ellipse is bounded; widen the window to its exact x
    // extent so all of it shows even when the points cover only an arc.
    match curve {
        Some(&Curve::Circle { h, r, .. }) => {
            x_min = x_min.min(h - r);
            x_max = x_max.max(h + r);
        }
        Some(&Curve::Ellipse { h, a, .. }) => {
            x_min = x_min.min(h - a);
            x_max = x_max.max(h + a);
        }
        _ => {}
    }

    let trace = curve.map(|c| c.trace(x_min, x_max, width * 2));

    // Conic branches are unbounded, so only the data frames the y window.
    let include_trace = !matches!(curve, Some(Curve::Conic { .. }));
    let (y_min, y_max) = y_window(points, trace.as_deref().filter(|_| include_trace));

    let mut grid = vec![vec![' '; width]; height];
    if let Some(trace) = &trace {
        draw_curve(&mut grid, trace, x_min, x_max, y_min, y_max);
    }
    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_window(points: &[DataPoint]) -> (f64, f64) {
    let xs: Vec<f64> = points
        .iter()
        .map(|p| p.x)
        .filter(|v| v.is_finite())
        .collect();
    if xs.is_empty() {
        return (-1.0, 1.0);
    }
    let (lo, hi) = stats::min_max(&xs);
    if hi - lo < 1e-9 { (lo - 1.0, hi + 1.0) } else { (lo, hi) }
}

fn y_window(points: &[DataPoint], trace: Option<&[(f64, f64)]>) -> (f64, f64) {
    let mut ys: Vec<f64> = points
        .iter()
        .map(|p| p.y)
        .filter(|v| v.is_finite())
        .collect();
    if let Some(trace) = trace {
        ys.extend(trace.iter().map(|&(_, y)| y).filter(|v| v.is_finite()));
    }
    if ys.is_empty() {
        return (0.0, 1.0);
    }
    let (lo, hi) = stats::min_max(&ys);
    if hi - lo < 1e-9 {
        return (lo - 1.0, hi + 1.0);
    }
    pad_range(lo, hi, 0.05)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is the top row.
    ((height as f64 - 1.0) - u * (height as f64 - 1.0)).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    trace: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();
    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in trace {
        let inside = x.is_finite()
            && y.is_finite()
            && x >= x_min
            && x <= x_max
            && y >= y_min
            && y <= y_max;
        if !inside {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = '-';
                }
            }
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are painted, so
/// earlier marks survive.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
