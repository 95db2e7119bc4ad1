//! Social golfer scheduling through a mixed-integer model
//!
//! Golfers are split into groups of a fixed size every week. The goal is a
//! schedule in which no two golfers share a group more than once; when that is
//! impossible, the total number of repeated meetings is minimised.
//!
//! The crate formulates the problem as a 0/1 model and hands it to an external
//! engine (COIN-OR CBC by default, Gurobi behind the `gurobi` feature). Search
//! is entirely the engine's business; this crate reads instances, builds the
//! model, decodes and checks schedules, and writes results.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use golfer::{lp_solver::SolveOptions, model::GolferModel, read_instance};
//! use std::path::Path;
//!
//! let instance = read_instance(Path::new("instance.txt"))?;
//! let solved = GolferModel::build(&instance).solve(&SolveOptions::default())?;
//! assert_eq!(solved.objective, solved.schedule.redundant_meetings());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`instance`]**: instance files and problem sizes
//! - **[`lp_solver`]**: engine-independent model builder and backends
//! - **[`model`]**: the social golfer formulation
//! - **[`schedule`]**: decoded schedules, solution files and checking
//! - **[`report`]**: human-readable reports

use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod instance;
pub mod lp_solver;
pub mod model;
pub mod report;
pub mod schedule;

pub use instance::{Instance, MalformedInstance, read_instance};
pub use lp_solver::OptimisationStatus;

/// Printed to stdout when the input file argument is missing.
pub const USAGE: &str = "Usage: golfer inputFile [outputFile] [timeLimit]";

/// Application-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The model has no feasible schedule.
    #[error("Problem Infeasible")]
    Infeasible,
    /// The engine stopped without a usable schedule.
    #[error("no schedule found (solver status: {0})")]
    NoSolution(OptimisationStatus),
}

/// Command-line interface arguments.
#[derive(Debug, Parser)]
#[clap(
    name = "golfer",
    about = "Social golfer scheduling with a mixed-integer solver",
    override_usage = "golfer inputFile [outputFile] [timeLimit]"
)]
pub struct CLIArguments {
    /// Instance file holding the number of groups, the group size and the number of weeks
    pub input: PathBuf,

    /// Solution output file; a verdict is also written to <output>.check
    pub output: Option<PathBuf>,

    /// Solver time limit in seconds
    #[clap(default_value_t = 10)]
    pub time_limit: u64,

    /// Output report file
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Solver threads
    #[clap(long, default_value_t = 1)]
    pub threads: u32,

    /// Append solver output to this file instead of discarding it
    #[clap(long)]
    pub solver_log: Option<PathBuf>,
}

impl CLIArguments {
    pub fn solve_options(&self) -> lp_solver::SolveOptions {
        lp_solver::SolveOptions {
            time_limit: Duration::from_secs(self.time_limit),
            threads: Some(self.threads),
            solver_log: self.solver_log.clone(),
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `golfer=info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("golfer=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read the instance, solve it, and write the requested outputs.
///
/// When an output file is given the written solution is re-read and checked;
/// the verdict goes to `<output>.check` and to stdout.
pub fn golfer_main(args: CLIArguments) -> Result<()> {
    let instance = read_instance(&args.input)?;

    let solved = model::GolferModel::build(&instance).solve(&args.solve_options())?;
    tracing::info!(
        objective = solved.objective,
        status = %solved.status,
        "schedule found"
    );

    if let Some(output) = &args.output {
        schedule::write_solution_file(output, &solved)?;

        let valid = schedule::check_solution_file(output, &instance)?;
        println!(
            "The solution is {}.",
            if valid { "valid" } else { "invalid" }
        );
    }

    if let Some(path) = &args.report {
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        report::write_report(&mut out, &solved)?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_positional_arguments() {
        let args = CLIArguments::try_parse_from(["golfer", "in.txt", "out.txt", "30"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.txt"));
        assert_eq!(args.output, Some(PathBuf::from("out.txt")));
        assert_eq!(args.solve_options().time_limit, Duration::from_secs(30));
    }

    #[test]
    fn test_defaults() {
        let args = CLIArguments::try_parse_from(["golfer", "in.txt"]).unwrap();
        assert_eq!(args.output, None);
        assert_eq!(args.time_limit, 10);
        assert_eq!(args.solve_options().threads, Some(1));
        assert_eq!(args.report, None);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = CLIArguments::try_parse_from(["golfer"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_non_numeric_time_limit_is_rejected() {
        assert!(CLIArguments::try_parse_from(["golfer", "in.txt", "out.txt", "soon"]).is_err());
    }
}
