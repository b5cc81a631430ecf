//! JSON export of a fit run.
//!
//! The export bundles everything needed to re-plot or compare a run later:
//! the input points, the structured result, the typed curve, and a
//! precomputed trace of curve samples. The schema carries a format version
//! so readers can detect incompatible changes.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{DataPoint, FitResult};
use crate::error::AppError;
use crate::math::stats;
use crate::models::Curve;

/// Bumped when the export schema changes shape.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Sample count for the precomputed trace.
const TRACE_SAMPLES: usize = 101;

/// One sampled point on the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub x: f64,
    pub y: f64,
}

/// Everything written to an export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    pub format_version: u32,
    pub generator: String,
    pub points: Vec<DataPoint>,
    pub result: FitResult,
    /// The typed curve; absent when the fit failed.
    pub curve: Option<Curve>,
    /// Curve samples for quick re-plotting; empty when the fit failed.
    pub trace: Vec<TracePoint>,
}

/// Assemble the export payload for a run.
pub fn build_export(points: &[DataPoint], curve: Option<&Curve>, result: &FitResult) -> ExportFile {
    let trace = curve
        .map(|c| {
            let (lo, hi) = trace_range(points);
            c.trace(lo, hi, TRACE_SAMPLES)
                .into_iter()
                .map(|(x, y)| TracePoint { x, y })
                .collect()
        })
        .unwrap_or_default();
    ExportFile {
        format_version: EXPORT_FORMAT_VERSION,
        generator: format!("cfit {}", env!("CARGO_PKG_VERSION")),
        points: points.to_vec(),
        result: result.clone(),
        curve: curve.cloned(),
        trace,
    }
}

/// Write the export as pretty-printed JSON.
pub fn write_export(path: &Path, export: &ExportFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// The x window for the trace: the data span padded by 5% each side.
/// Degenerate spans widen to a unit window so the trace never collapses.
fn trace_range(points: &[DataPoint]) -> (f64, f64) {
    let xs: Vec<f64> = points
        .iter()
        .map(|p| p.x)
        .filter(|v| v.is_finite())
        .collect();
    if xs.is_empty() {
        return (-1.0, 1.0);
    }
    let (lo, hi) = stats::min_max(&xs);
    let span = hi - lo;
    if span < 1e-9 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - 0.05 * span, hi + 0.05 * span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EquationKind;
    use crate::error::FitError;
    use crate::report::equation;

    #[test]
    fn export_carries_version_points_and_trace() {
        let points = vec![
            DataPoint::new(1.0, 0.0),
            DataPoint::new(0.0, 1.0),
            DataPoint::new(-1.0, 0.0),
        ];
        let curve = Curve::Circle {
            h: 0.0,
            k: 0.0,
            r: 1.0,
        };
        let result = equation::build_result(EquationKind::Circle, &curve, None, false);
        let export = build_export(&points, Some(&curve), &result);

        assert_eq!(export.format_version, EXPORT_FORMAT_VERSION);
        assert!(export.generator.starts_with("cfit "));
        assert_eq!(export.points.len(), 3);
        assert_eq!(export.trace.len(), TRACE_SAMPLES);
        for p in &export.trace {
            let dist = (p.x * p.x + p.y * p.y).sqrt();
            assert!((dist - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn failed_fit_exports_without_curve_or_trace() {
        let points = vec![DataPoint::new(1.0, 1.0), DataPoint::new(1.0, 1.0)];
        let result = FitResult::failure(
            EquationKind::Linear,
            &FitError::DuplicatePoints { x: 1.0, y: 1.0 },
        );
        let export = build_export(&points, None, &result);
        assert!(export.curve.is_none());
        assert!(export.trace.is_empty());
        assert!(export.result.is_error());
    }

    #[test]
    fn export_round_trips_through_json() {
        let points = vec![DataPoint::new(0.0, 1.0), DataPoint::new(2.0, 5.0)];
        let curve = Curve::Polynomial {
            coeffs: vec![2.0, 1.0],
        };
        let result = equation::build_result(EquationKind::Linear, &curve, None, false);
        let export = build_export(&points, Some(&curve), &result);

        let json = serde_json::to_string(&export).unwrap();
        let back: ExportFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.format_version, export.format_version);
        assert_eq!(back.result.equation, "y = 2x + 1");
        assert_eq!(back.points, export.points);
        assert_eq!(back.curve, export.curve);
    }

    #[test]
    fn trace_range_pads_and_widens() {
        let spread = vec![DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 0.0)];
        let (lo, hi) = trace_range(&spread);
        assert!((lo - -0.5).abs() < 1e-12);
        assert!((hi - 10.5).abs() < 1e-12);

        let single = vec![DataPoint::new(3.0, 0.0)];
        let (lo, hi) = trace_range(&single);
        assert!((lo - 2.0).abs() < 1e-12);
        assert!((hi - 4.0).abs() < 1e-12);

        assert_eq!(trace_range(&[]), (-1.0, 1.0));
    }
}
