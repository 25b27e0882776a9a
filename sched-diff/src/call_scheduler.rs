// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use crate::args::{ComparisonArgs, MemoryMode};
use crate::errors::DiffError;
use crate::session::DiffSession;
use crate::summary_parser::{SchedulerStatistics, extract_summary};
use crate::util::render_command;

/// The outcome of one scheduler run in one memory mode.
#[derive(Debug)]
pub struct SchedulerRun {
    pub mode: MemoryMode,
    /// The rendered command line.
    pub command: String,
    /// The summary line selected by the configured contract.
    pub summary: String,
    pub statistics: SchedulerStatistics,
    pub runtime: Duration,
}

impl DiffSession {
    /// Run the scheduler on `workload` in memory mode `mode` and extract its summary line.
    pub fn run_scheduler(
        &self,
        args: &ComparisonArgs,
        workload: &Path,
        mode: MemoryMode,
    ) -> Result<SchedulerRun, DiffError> {
        let cmd = scheduler_command(args, workload, mode)?;
        let output = self.run_captured(cmd, args.run_timeout())?;
        let summary = extract_summary(&output.stdout, args.summary_contract)
            .map_err(|cause| DiffError::MalformedOutput { command: output.command.clone(), cause })?
            .to_string();
        debug!(%mode, %summary, "run_scheduler");
        Ok(SchedulerRun {
            mode,
            statistics: SchedulerStatistics::parse(&output.stdout),
            command: output.command,
            summary,
            runtime: output.runtime,
        })
    }
}

/// Build the scheduler command line. Only `mode` differs between the two runs of a comparison.
pub fn scheduler_command(
    args: &ComparisonArgs,
    workload: &Path,
    mode: MemoryMode,
) -> Result<Command, DiffError> {
    let flags = scheduler_flags(args, workload, mode);
    let program = resolve_scheduler(&args.scheduler).map_err(|source| {
        let mut unresolved = Command::new(&args.scheduler);
        unresolved.args(&flags);
        let command = render_command(&unresolved).to_string_lossy().into_owned();
        DiffError::Launch { command, source }
    })?;
    let mut cmd = Command::new(program);
    cmd.args(flags);
    Ok(cmd)
}

fn scheduler_flags(args: &ComparisonArgs, workload: &Path, mode: MemoryMode) -> Vec<OsString> {
    vec![
        "-f".into(),
        workload.as_os_str().to_owned(),
        "-a".into(),
        args.algorithm.to_string().into(),
        "-s".into(),
        args.memory_size.to_string().into(),
        "-m".into(),
        mode.to_string().into(),
        "-q".into(),
        args.quantum.to_string().into(),
    ]
}

/// Paths with a directory part are used as they are. Bare names are looked up in PATH.
fn resolve_scheduler(scheduler: &Path) -> std::io::Result<PathBuf> {
    if scheduler.components().count() > 1 {
        return Ok(scheduler.to_path_buf());
    }
    which::which(scheduler).map_err(|err| std::io::Error::new(std::io::ErrorKind::NotFound, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{SchedDiffArgs, SchedDiffCommand};
    use clap::Parser;

    fn comparison(extra: &str) -> ComparisonArgs {
        let args = SchedDiffArgs::try_parse_from(format!("sched-diff compare {extra}").split_whitespace())
            .unwrap();
        match args.command {
            SchedDiffCommand::Compare(compare) => compare.comparison,
            _ => unreachable!(),
        }
    }

    #[test]
    fn check_default_command_lines() {
        let args = comparison("");
        let workload = Path::new("benchmark-cm.txt");
        let v = scheduler_command(&args, workload, MemoryMode::V).unwrap();
        let cm = scheduler_command(&args, workload, MemoryMode::Cm).unwrap();
        assert_eq!(render_command(&v), "./scheduler -f benchmark-cm.txt -a rr -s 100 -m v -q 10");
        assert_eq!(render_command(&cm), "./scheduler -f benchmark-cm.txt -a rr -s 100 -m cm -q 10");
    }

    #[test]
    fn check_custom_command_line() {
        let args = comparison("--scheduler bin/sched --algorithm ff --memory-size 64 --quantum 3");
        let cmd = scheduler_command(&args, Path::new("w.txt"), MemoryMode::P).unwrap();
        assert_eq!(render_command(&cmd), "bin/sched -f w.txt -a ff -s 64 -m p -q 3");
    }

    #[test]
    fn check_unknown_bare_scheduler() {
        let args = comparison("--scheduler no-such-scheduler-binary-xyz");
        let err = scheduler_command(&args, Path::new("w.txt"), MemoryMode::V).unwrap_err();
        match err {
            DiffError::Launch { command, source } => {
                assert_eq!(command, "no-such-scheduler-binary-xyz -f w.txt -a rr -s 100 -m v -q 10");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn check_bare_name_found_in_path() {
        let args = comparison("--scheduler sh");
        let cmd = scheduler_command(&args, Path::new("w.txt"), MemoryMode::V).unwrap();
        assert!(Path::new(cmd.get_program()).is_absolute());
    }
}
