//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// A single 2D observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Exact coordinate equality, used for duplicate detection in the
    /// exact solvers.
    pub fn coincides(&self, other: &DataPoint) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Which equation family to fit.
///
/// Exact families require an exact point count and interpolate their inputs;
/// approximation families take a minimum count and minimize least-squares
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EquationKind {
    Linear,
    Quadratic,
    Cubic,
    Circle,
    Ellipse,
    Conic,
    Sine,
    Logarithm,
    Exponential,
}

impl EquationKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            EquationKind::Linear => "linear",
            EquationKind::Quadratic => "quadratic",
            EquationKind::Cubic => "cubic",
            EquationKind::Circle => "circle",
            EquationKind::Ellipse => "ellipse",
            EquationKind::Conic => "general conic",
            EquationKind::Sine => "sine",
            EquationKind::Logarithm => "logarithm",
            EquationKind::Exponential => "exponential",
        }
    }

    /// True for families solved exactly through their points.
    ///
    /// The ellipse counts as an approximation family: it is fitted by a
    /// least-squares optimizer and accepts any number of points at or
    /// above its minimum.
    pub fn is_exact(self) -> bool {
        match self {
            EquationKind::Linear
            | EquationKind::Quadratic
            | EquationKind::Cubic
            | EquationKind::Circle
            | EquationKind::Conic => true,
            EquationKind::Ellipse
            | EquationKind::Sine
            | EquationKind::Logarithm
            | EquationKind::Exponential => false,
        }
    }

    /// Required point count: exact for exact families, a minimum for
    /// approximation families.
    pub fn required_points(self) -> usize {
        match self {
            EquationKind::Linear => 2,
            EquationKind::Quadratic => 3,
            EquationKind::Cubic => 4,
            EquationKind::Circle => 3,
            EquationKind::Ellipse => 4,
            EquationKind::Conic => 5,
            EquationKind::Sine | EquationKind::Logarithm | EquationKind::Exponential => 3,
        }
    }

    /// Polynomial degree for the polynomial families, `None` otherwise.
    pub fn polynomial_degree(self) -> Option<usize> {
        match self {
            EquationKind::Linear => Some(1),
            EquationKind::Quadratic => Some(2),
            EquationKind::Cubic => Some(3),
            _ => None,
        }
    }
}

/// A fit request as it arrives from callers or files.
///
/// Kept serde-friendly (no clocks inside); the engine turns it into
/// concrete fit options with a fresh search budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRequest {
    pub kind: EquationKind,
    pub points: Vec<DataPoint>,
    /// Render coefficients as small fractions where one matches.
    #[serde(default)]
    pub use_fractions: bool,
    /// Soft wall-clock budget for the guess search, in milliseconds.
    /// `None` means the engine default.
    #[serde(default)]
    pub budget_ms: Option<u64>,
}

/// The outcome of one fit.
///
/// Exactly one of `equation` / `error` is meaningful: a successful fit has
/// a non-empty equation and no error, a failed one has an empty equation,
/// empty coefficients, and an error message from the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub kind: EquationKind,
    /// Parameter name → value, alphabetically ordered (deterministic
    /// iteration and serialization).
    pub coefficients: BTreeMap<String, f64>,
    pub equation: String,
    /// Plain-ASCII expression for an external grapher.
    pub machine_equation: Option<String>,
    /// Coefficient of determination in `[0, 1]`; absent for exact fits
    /// and for failures.
    pub r_squared: Option<f64>,
    pub error: Option<String>,
}

impl FitResult {
    /// A result carrying only an error message.
    pub fn failure(kind: EquationKind, err: &FitError) -> Self {
        Self {
            kind,
            coefficients: BTreeMap::new(),
            equation: String::new(),
            machine_equation: None,
            r_squared: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
