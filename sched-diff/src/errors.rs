// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Failures of one differential run. Every variant ends the run; nothing is retried.

use crate::summary_parser::MalformedOutput;
use sched_workload::WorkloadError;
use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The workload file could not be generated, written or read.
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    /// The scheduler executable is missing or cannot be started.
    #[error("failed to launch `{command}`")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Collecting the output of a running scheduler failed.
    #[error("failed to collect the output of `{command}`")]
    Capture {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The scheduler ran but did not exit successfully.
    #[error("`{command}` exited with {status}")]
    Execution { command: String, status: ExitStatus },

    /// The scheduler ran past the configured limit and was killed.
    #[error("`{command}` did not finish within {limit:?} and was killed")]
    Timeout { command: String, limit: Duration },

    /// The summary line could not be located in the scheduler output.
    #[error("unexpected output from `{command}`")]
    MalformedOutput {
        command: String,
        #[source]
        cause: MalformedOutput,
    },

    /// Strict mode only: the two runs produced different summaries.
    #[error("summaries differ between modes {baseline_mode} and {candidate_mode}")]
    Divergence { baseline_mode: String, candidate_mode: String },
}
