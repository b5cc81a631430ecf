//! Built-in demo data.

pub mod sample;

pub use sample::{DemoData, generate, showcase_curve};
