// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Module that defines sched-diff's command line interface. This includes all subcommands.

pub mod common;
pub mod compare_args;
pub mod generate_args;

pub use compare_args::*;
pub use generate_args::*;

use self::common::*;
use clap::error::Error;
use std::path::PathBuf;

/// Trait used to perform extra validation after parsing.
pub trait ValidateArgs {
    /// Perform post-parsing validation but do not abort.
    fn validate(&self) -> Result<(), Error>;
}

/// Validate a set of arguments and ensure they are in a valid state.
/// This method will abort execution with a user friendly error message if the state is invalid.
pub fn check_is_valid<T>(command: &T)
where
    T: clap::Parser + ValidateArgs,
{
    if let Err(e) = command.validate() {
        e.format(&mut T::command()).exit()
    }
}

/// Name of the workload file when none is given. The scheduler reads it by this name.
pub const DEFAULT_WORKLOAD: &str = "benchmark-cm.txt";

#[derive(Debug, clap::Parser)]
#[command(
    version,
    name = "sched-diff",
    about = "Generate a random process workload and compare a scheduler's output under two memory modes",
    args_override_self = true
)]
pub struct SchedDiffArgs {
    #[command(flatten)]
    pub common_args: CommonArgs,

    #[command(subcommand)]
    pub command: SchedDiffCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SchedDiffCommand {
    /// Write a random workload file.
    #[command(args_override_self = true)]
    Generate(GenerateArgs),

    /// Run the scheduler twice on an existing workload file and compare the summaries.
    #[command(args_override_self = true)]
    Compare(CompareArgs),

    /// Generate a workload, then compare the scheduler on it.
    #[command(args_override_self = true)]
    Run(RunArgs),
}

impl SchedDiffCommand {
    /// Subcommand names, as they appear on the command line.
    pub const NAMES: [&'static str; 3] = ["generate", "compare", "run"];
}

/// Path of the workload file shared by generation and comparison.
#[derive(Debug, clap::Args)]
pub struct WorkloadArg {
    /// Workload file to write or read
    #[arg(long, default_value = DEFAULT_WORKLOAD, value_name = "PATH")]
    pub workload: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub workload: WorkloadArg,

    #[command(flatten)]
    pub generation: GenerationArgs,
}

#[derive(Debug, clap::Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub workload: WorkloadArg,

    #[command(flatten)]
    pub comparison: ComparisonArgs,
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub workload: WorkloadArg,

    #[command(flatten)]
    pub generation: GenerationArgs,

    #[command(flatten)]
    pub comparison: ComparisonArgs,
}

impl ValidateArgs for CompareArgs {
    fn validate(&self) -> Result<(), Error> {
        if !self.workload.workload.is_file() {
            return Err(Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!(
                    "Invalid argument: `--workload` argument `{}` is not a file",
                    self.workload.workload.display()
                ),
            ));
        }
        self.comparison.validate()
    }
}

impl ValidateArgs for SchedDiffArgs {
    fn validate(&self) -> Result<(), Error> {
        self.common_args.validate()?;
        match &self.command {
            SchedDiffCommand::Generate(args) => args.generation.validate(),
            SchedDiffCommand::Compare(args) => args.validate(),
            SchedDiffCommand::Run(args) => {
                args.generation.validate()?;
                args.comparison.validate()
            }
        }
    }
}
