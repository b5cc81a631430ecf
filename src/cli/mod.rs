//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DataPoint, EquationKind};
use crate::fit::DEFAULT_BUDGET_MS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cfit", version, about = "Fit equations to 2D points")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit an equation family to points from a file and/or --point flags.
    Fit(FitArgs),
    /// Generate seeded demo data for a family, then fit it.
    Demo(DemoArgs),
}

/// Options for fitting user-supplied points.
#[derive(Debug, Parser)]
pub struct FitArgs {
    /// Equation family to fit.
    #[arg(short, long, value_enum)]
    pub kind: EquationKind,

    /// Points file (one `x,y` pair per line; `#` comments allowed).
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Inline point as `x,y` (repeatable).
    #[arg(
        short,
        long,
        value_parser = parse_point,
        value_name = "X,Y",
        allow_hyphen_values = true
    )]
    pub point: Vec<DataPoint>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for the built-in demo datasets.
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Equation family to demo.
    #[arg(short, long, value_enum)]
    pub kind: EquationKind,

    /// Points to generate (approximation families; exact families always
    /// sample their required count).
    #[arg(short = 'n', long, default_value_t = 40)]
    pub count: usize,

    /// Gaussian noise standard deviation.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed for data generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by `fit` and `demo`.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Render near-rational coefficients as fractions.
    #[arg(long)]
    pub fractions: bool,

    /// Soft time budget for approximation searches, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_BUDGET_MS)]
    pub budget_ms: u64,

    /// Render an ASCII plot of the points and fitted curve.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the run (points, result, curve trace) to a JSON file.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

/// Parse an inline `x,y` point argument.
fn parse_point(raw: &str) -> Result<DataPoint, String> {
    let (x_raw, y_raw) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{raw}'"))?;
    let x = parse_coord(x_raw, "x")?;
    let y = parse_coord(y_raw, "y")?;
    Ok(DataPoint::new(x, y))
}

fn parse_coord(raw: &str, name: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| format!("invalid {name} value '{trimmed}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {name} value '{trimmed}'"));
    }
    Ok(value)
}
