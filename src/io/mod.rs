//! Input/output helpers.
//!
//! - point-file ingest + validation (`points`)
//! - JSON run export (`export`)

pub mod export;
pub mod points;

pub use export::{ExportFile, TracePoint, build_export, write_export};
pub use points::{load_points, parse_points};
