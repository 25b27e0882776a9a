// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Arguments that shape workload generation.

use crate::args::ValidateArgs;
use clap::error::{Error, ErrorKind};
use sched_workload::{Bounds, PidStrategy, WorkloadConfig};

/// Workload generation options. Every `*-limit` is an exclusive upper bound.
#[derive(Debug, clap::Args)]
pub struct GenerationArgs {
    /// Seed for the random number generator. A fresh seed is drawn and reported when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Generate exactly this many processes instead of a random count
    #[arg(long)]
    pub count: Option<u32>,

    /// How unique pids are drawn
    #[arg(long, default_value = "rejection", ignore_case = true, value_enum)]
    pub pid_strategy: PidStrategy,

    /// Upper bound of the process count
    #[arg(long, default_value_t = 20, hide_short_help = true)]
    pub count_limit: u32,
    /// Upper bound of arrival times
    #[arg(long, default_value_t = 100, hide_short_help = true)]
    pub arrival_limit: u32,
    /// Upper bound of pids
    #[arg(long, default_value_t = 20, hide_short_help = true)]
    pub pid_limit: u32,
    /// Upper bound of memory demands
    #[arg(long, default_value_t = 100, hide_short_help = true)]
    pub memory_limit: u32,
    /// Upper bound of burst times
    #[arg(long, default_value_t = 100, hide_short_help = true)]
    pub burst_limit: u32,
}

impl GenerationArgs {
    /// The bounds table described by these arguments. Lower bounds are fixed.
    pub fn workload_config(&self) -> WorkloadConfig {
        let defaults = WorkloadConfig::default();
        WorkloadConfig {
            count: Bounds::new(defaults.count.lower, self.count_limit),
            arrival_time: Bounds::new(defaults.arrival_time.lower, self.arrival_limit),
            pid: Bounds::new(defaults.pid.lower, self.pid_limit),
            memory_demand: Bounds::new(defaults.memory_demand.lower, self.memory_limit),
            burst_time: Bounds::new(defaults.burst_time.lower, self.burst_limit),
            pid_strategy: self.pid_strategy,
        }
    }
}

impl ValidateArgs for GenerationArgs {
    fn validate(&self) -> Result<(), Error> {
        let config = self.workload_config();
        if let Err(err) = config.validate() {
            return Err(Error::raw(ErrorKind::ValueValidation, err.to_string()));
        }
        if let Some(count) = self.count {
            if !config.count.contains(count) {
                return Err(Error::raw(
                    ErrorKind::ValueValidation,
                    format!(
                        "Invalid argument: `--count {count}` must be below `--count-limit {}`",
                        self.count_limit
                    ),
                ));
            }
        }
        Ok(())
    }
}
