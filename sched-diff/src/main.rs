// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use sched_workload::{Workload, WorkloadConfig, WorkloadError, WorkloadGenerator, fresh_seed};
use tracing::{debug, info};

use crate::args::{ComparisonArgs, GenerationArgs, SchedDiffArgs, SchedDiffCommand, check_is_valid};
use crate::args_toml::join_args;
use crate::diff_runner::DifferentialRunner;
use crate::session::DiffSession;

mod args;
mod args_toml;
mod call_scheduler;
mod diff_runner;
mod errors;
mod report;
mod session;
mod summary_parser;
mod util;

/// The main function for `sched-diff`.
fn main() -> ExitCode {
    let result = parse_args(std::env::args_os().collect()).and_then(|args| {
        session::init_logger(&args.common_args);
        run(args)
    });

    if let Err(error) = result {
        // We are using the debug format for now to print the all the context.
        debug!(?error, "main_failure");
        util::error(&format!("{error:#}"));
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Parse the command line, with defaults from the config file, and abort on invalid input.
fn parse_args(input_args: Vec<OsString>) -> Result<SchedDiffArgs> {
    let input_args = join_args(input_args)?;
    let args = SchedDiffArgs::parse_from(input_args);
    check_is_valid(&args);
    Ok(args)
}

fn run(args: SchedDiffArgs) -> Result<()> {
    let SchedDiffArgs { common_args, command } = args;
    let session = DiffSession::new(common_args)?;

    match command {
        SchedDiffCommand::Generate(args) => {
            generate_workload(&session, &args.workload.workload, &args.generation)?;
            Ok(())
        }
        SchedDiffCommand::Compare(args) => {
            check_input(&args.workload.workload)?;
            compare_workload(&session, &args.workload.workload, &args.comparison, None)
        }
        SchedDiffCommand::Run(args) => {
            let seed = generate_workload(&session, &args.workload.workload, &args.generation)?;
            compare_workload(&session, &args.workload.workload, &args.comparison, Some(seed))
        }
    }
}

/// Generate a fresh workload and write it to `path`. Returns the seed it was drawn with.
fn generate_workload(session: &DiffSession, path: &Path, args: &GenerationArgs) -> Result<u64> {
    let seed = args.seed.unwrap_or_else(fresh_seed);
    let mut generator = WorkloadGenerator::seeded(args.workload_config(), seed)?;
    let workload = match args.count {
        Some(count) => generator.generate_with_count(count)?,
        None => generator.generate(),
    };
    workload.write(path)?;
    info!(seed, processes = workload.len(), path = %path.display(), "generate_workload");

    if !session.args.quiet {
        util::info_operation(
            "Generated",
            &format!("{} processes in {} (seed {seed})", workload.len(), path.display()),
        );
    }
    Ok(seed)
}

/// Warn about input files that the generator would never have written. Only an unreadable file
/// stops the comparison; the scheduler gets to decide what it makes of odd contents.
fn check_input(path: &Path) -> Result<()> {
    let problem = match Workload::read(path) {
        Ok(workload) => workload.check_invariants(&WorkloadConfig::default()).err(),
        Err(err @ WorkloadError::Read { .. }) => return Err(err.into()),
        Err(err) => Some(err),
    };
    if let Some(problem) = problem {
        util::warning(&format!("{}: {problem}", path.display()));
    }
    Ok(())
}

/// Run both memory modes on the workload at `path` and report the outcome.
fn compare_workload(
    session: &DiffSession,
    path: &Path,
    args: &ComparisonArgs,
    seed: Option<u64>,
) -> Result<()> {
    let runner = DifferentialRunner { sess: session, args };
    let comparison = runner.compare(path, seed)?;
    report::print_report(&comparison, args.format, args.statistics, session.args.quiet)?;
    comparison.check(args.strict)?;
    Ok(())
}
