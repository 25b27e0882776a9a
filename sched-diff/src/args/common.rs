// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Define arguments that should be common to all subcommands.
use crate::args::ValidateArgs;
use clap::error::{Error, ErrorKind};
use std::path::PathBuf;

/// Common arguments accepted before or after any subcommand.
#[derive(Debug, Default, clap::Args)]
pub struct CommonArgs {
    /// Produce full debug information
    #[arg(long, global = true)]
    pub debug: bool,
    /// Produces no output, just an exit code and requested artifacts; overrides --verbose
    #[arg(long, short, global = true)]
    pub quiet: bool,
    /// Output processing stages and commands, along with minor debug information
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Read default flags from this file instead of `sched-diff.toml`
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    /// Whether processing stages and commands should be printed. `--debug` implies it.
    pub fn is_verbose(&self) -> bool {
        !self.quiet && (self.verbose || self.debug)
    }
}

impl ValidateArgs for CommonArgs {
    fn validate(&self) -> Result<(), Error> {
        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(Error::raw(
                    ErrorKind::InvalidValue,
                    format!(
                        "Invalid argument: `--config` argument `{}` is not a file",
                        config.display()
                    ),
                ));
            }
        }
        Ok(())
    }
}
