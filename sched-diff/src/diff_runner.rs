// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::{Path, PathBuf};
use tracing::info;

use crate::args::ComparisonArgs;
use crate::call_scheduler::SchedulerRun;
use crate::errors::DiffError;
use crate::session::DiffSession;

/// A DifferentialRunner runs the scheduler on one workload once per memory mode.
///
/// This struct is basically just a nicer way of passing many arguments to [`Self::compare`]
pub(crate) struct DifferentialRunner<'sess> {
    /// The underlying session
    pub sess: &'sess DiffSession,
    /// Scheduler options shared by both runs
    pub args: &'sess ComparisonArgs,
}

/// Both runs of one comparison, baseline first.
#[derive(Debug)]
pub(crate) struct Comparison {
    pub workload: PathBuf,
    /// Seed the workload was generated with, when this process generated it.
    pub seed: Option<u64>,
    pub baseline: SchedulerRun,
    pub candidate: SchedulerRun,
}

impl Comparison {
    /// The two summary lines, baseline first.
    pub fn summaries(&self) -> (&str, &str) {
        (&self.baseline.summary, &self.candidate.summary)
    }

    pub fn diverged(&self) -> bool {
        let (baseline, candidate) = self.summaries();
        baseline != candidate
    }

    /// In strict mode a divergence is an error; otherwise it is only reported.
    pub fn check(&self, strict: bool) -> Result<(), DiffError> {
        if strict && self.diverged() {
            return Err(DiffError::Divergence {
                baseline_mode: self.baseline.mode.to_string(),
                candidate_mode: self.candidate.mode.to_string(),
            });
        }
        Ok(())
    }
}

impl<'sess> DifferentialRunner<'sess> {
    /// Run the baseline mode, then the candidate mode, on `workload`. The runs never overlap,
    /// and the first failure ends the comparison.
    pub fn compare(&self, workload: &Path, seed: Option<u64>) -> Result<Comparison, DiffError> {
        let baseline = self.sess.run_scheduler(self.args, workload, self.args.baseline_mode)?;
        let candidate = self.sess.run_scheduler(self.args, workload, self.args.candidate_mode)?;
        let comparison =
            Comparison { workload: workload.to_path_buf(), seed, baseline, candidate };
        info!(diverged = comparison.diverged(), "compare");
        Ok(comparison)
    }
}
