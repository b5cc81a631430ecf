//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - input observations (`DataPoint`)
//! - the equation family enum (`EquationKind`)
//! - request and result types (`FitRequest`, `FitResult`)

pub mod types;

pub use types::*;
