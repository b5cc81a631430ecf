//! Mathematical utilities: the dense linear solver and statistics helpers.

pub mod linsys;
pub mod stats;

pub use linsys::*;
pub use stats::*;
