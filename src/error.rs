//! Error types for the fitting engine and the CLI.
//!
//! `FitError` is the library-level taxonomy: every way a fit can fail maps
//! to exactly one variant, and the engine converts it into the `error`
//! field of a `FitResult` at the boundary. `AppError` carries an exit code
//! for the binary.

/// Why a fit could not be produced.
#[derive(Clone, PartialEq)]
pub enum FitError {
    /// Two input points coincide; exact solvers need distinct points.
    /// Carries the coordinates of the first offending pair.
    DuplicatePoints { x: f64, y: f64 },
    /// Point count does not satisfy the family's requirement.
    WrongPointCount {
        expected: usize,
        got: usize,
        /// True when `expected` is an exact count, false when a minimum.
        exact: bool,
    },
    /// The geometry admits no solution: singular system, collinear
    /// circle points, non-positive radius or axis, sign constraint
    /// violated. Carries a short description of what degenerated.
    DegenerateGeometry(String),
    /// Logarithmic fits need every x strictly positive.
    NonPositiveDomain { x: f64 },
    /// A solver produced a non-finite coefficient.
    InvalidCoefficients,
    /// Every ellipse initialization failed validation.
    NoValidFit,
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::DuplicatePoints { x, y } => {
                write!(f, "duplicate input point ({x}, {y}); points must be distinct")
            }
            FitError::WrongPointCount {
                expected,
                got,
                exact,
            } => {
                if *exact {
                    write!(f, "expected exactly {expected} points, got {got}")
                } else {
                    write!(f, "expected at least {expected} points, got {got}")
                }
            }
            FitError::DegenerateGeometry(what) => {
                write!(f, "degenerate geometry: {what}")
            }
            FitError::NonPositiveDomain { x } => {
                write!(f, "logarithmic fit requires every x > 0, found x = {x}")
            }
            FitError::InvalidCoefficients => {
                write!(f, "fit produced non-finite coefficients")
            }
            FitError::NoValidFit => {
                write!(f, "no valid fit found for the given points")
            }
        }
    }
}

impl std::fmt::Debug for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FitError({self})")
    }
}

impl std::error::Error for FitError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
