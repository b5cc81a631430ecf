//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates input points
//! - runs the fit
//! - prints reports/plots
//! - writes the optional JSON export

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, FitArgs, OutputArgs};
use crate::domain::{DataPoint, EquationKind};
use crate::error::AppError;
use crate::fit::{FitOptions, SearchBudget};

/// Entry point for the `cfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let mut points = match &args.data {
        Some(path) => crate::io::load_points(path)?,
        None => Vec::new(),
    };
    points.extend(args.point.iter().copied());
    if points.is_empty() {
        return Err(AppError::new(
            2,
            "No input points. Pass --data FILE and/or --point X,Y.",
        ));
    }

    fit_and_present(args.kind, &points, &args.output)
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let demo = crate::data::generate(args.kind, args.count, args.noise, args.seed)?;
    println!(
        "{}",
        crate::report::format_demo_header(
            args.kind,
            &demo.truth,
            demo.points.len(),
            args.noise,
            args.seed,
        )
    );

    fit_and_present(args.kind, &demo.points, &args.output)
}

/// Shared fit-and-present path for both subcommands.
///
/// Failed fits still print their summary and still export (the export
/// records the error); the nonzero exit code is the last step.
fn fit_and_present(
    kind: EquationKind,
    points: &[DataPoint],
    output: &OutputArgs,
) -> Result<(), AppError> {
    let options = FitOptions {
        use_fractions: output.fractions,
        budget: SearchBudget::from_millis(output.budget_ms),
    };
    let (curve, result) = crate::fit::fit_with_curve(kind, points, &options);

    println!(
        "{}",
        crate::report::format_run_summary(points, curve.as_ref(), &result)
    );

    if output.plot {
        let plot = crate::plot::render_plot(points, curve.as_ref(), output.width, output.height);
        println!("{plot}");
    }

    if let Some(path) = &output.export {
        let export = crate::io::build_export(points, curve.as_ref(), &result);
        crate::io::write_export(path, &export)?;
    }

    match result.error {
        Some(message) => Err(AppError::new(3, message)),
        None => Ok(()),
    }
}
