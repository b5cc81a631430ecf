//! Reporting: equation rendering and formatted terminal output.

pub mod equation;
pub mod format;

pub use equation::{build_result, render, render_machine};
pub use format::{format_demo_header, format_run_summary};
