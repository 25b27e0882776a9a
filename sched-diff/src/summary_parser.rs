// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locate the summary line, and the statistics block, in the scheduler's standard output.
//!
//! Two contracts are understood:
//! - the marker contract: a line starting with [`SUMMARY_MARKER`]; the rest of the line is the
//!   summary. When several are printed the last one wins.
//! - the legacy positional contract: the third-from-last newline separated segment. A scheduler
//!   that ends its output with a newline thus has its summary two lines above the last line.
//!
//! The stock scheduler ends with:
//!
//! ```text
//! Throughput 2 1 3
//! Turnaround time 62
//! Time overhead 2.93 1.84
//! Makespan 145
//! ```
//!
//! so its legacy summary is the `Time overhead` line.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Versioned prefix of the machine readable summary line.
pub const SUMMARY_MARKER: &str = "@sched-diff/v1 summary:";

/// Minimum number of output lines the legacy contract needs.
const LEGACY_MIN_LINES: usize = 3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SummaryContract {
    /// Use the marker line when present, the legacy position otherwise
    #[default]
    Auto,
    /// Require a line starting with the summary marker
    Marker,
    /// Third line from the end of the output
    Legacy,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedOutput {
    #[error("expected at least 3 lines of output, found {found}")]
    TooFewLines { found: usize },
    #[error("no line starts with `@sched-diff/v1 summary:`")]
    MissingMarker,
}

/// Extract the summary line of one scheduler run.
pub fn extract_summary(stdout: &str, contract: SummaryContract) -> Result<&str, MalformedOutput> {
    match contract {
        SummaryContract::Marker => marker_summary(stdout).ok_or(MalformedOutput::MissingMarker),
        SummaryContract::Legacy => legacy_summary(stdout),
        SummaryContract::Auto => match marker_summary(stdout) {
            Some(summary) => Ok(summary),
            None => legacy_summary(stdout),
        },
    }
}

fn marker_summary(stdout: &str) -> Option<&str> {
    stdout.lines().rev().find_map(|line| line.strip_prefix(SUMMARY_MARKER)).map(str::trim)
}

fn legacy_summary(stdout: &str) -> Result<&str, MalformedOutput> {
    let found = stdout.lines().count();
    if found < LEGACY_MIN_LINES {
        return Err(MalformedOutput::TooFewLines { found });
    }
    // There are at least as many segments as lines, so the index is in range.
    let segments: Vec<&str> = stdout.split('\n').collect();
    let summary = segments[segments.len() - LEGACY_MIN_LINES];
    Ok(summary.strip_suffix('\r').unwrap_or(summary))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Throughput {
    pub average: i64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overhead {
    pub max: f64,
    pub average: f64,
}

/// The statistics block printed by the stock scheduler. Lines that are absent or do not parse
/// are left empty.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SchedulerStatistics {
    pub throughput: Option<Throughput>,
    pub turnaround: Option<i64>,
    pub overhead: Option<Overhead>,
    pub makespan: Option<i64>,
}

static THROUGHPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Throughput (-?\d+) (-?\d+) (-?\d+)$").unwrap());
static TURNAROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Turnaround time (-?\d+)$").unwrap());
static OVERHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Time overhead (\S+) (\S+)$").unwrap());
static MAKESPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Makespan (-?\d+)$").unwrap());

impl SchedulerStatistics {
    /// Collect the statistics lines from anywhere in `stdout`. Later lines win.
    pub fn parse(stdout: &str) -> Self {
        let mut stats = SchedulerStatistics::default();
        for line in stdout.lines().map(str::trim_end) {
            if let Some(c) = THROUGHPUT.captures(line) {
                if let (Ok(average), Ok(min), Ok(max)) =
                    (c[1].parse(), c[2].parse(), c[3].parse())
                {
                    stats.throughput = Some(Throughput { average, min, max });
                }
            } else if let Some(c) = TURNAROUND.captures(line) {
                stats.turnaround = c[1].parse().ok();
            } else if let Some(c) = OVERHEAD.captures(line) {
                if let (Ok(max), Ok(average)) = (c[1].parse(), c[2].parse()) {
                    stats.overhead = Some(Overhead { max, average });
                }
            } else if let Some(c) = MAKESPAN.captures(line) {
                stats.makespan = c[1].parse().ok();
            }
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        *self == SchedulerStatistics::default()
    }
}
