// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Module used to configure a sched-diff session: logging and child process execution.

use crate::args::common::CommonArgs;
use crate::errors::DiffError;
use crate::util::render_command;
use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Environment variable used to control this session log tracing.
const LOG_ENV_VAR: &str = "SCHED_DIFF_LOG";

/// Initialize the logger using the SCHED_DIFF_LOG environment variable and the verbosity flags.
/// Logs go to stderr so they never mix with the summaries on stdout.
pub fn init_logger(args: &CommonArgs) {
    let mut filter = EnvFilter::from_env(LOG_ENV_VAR);
    let directives: &[&str] = if args.quiet {
        &[]
    } else if args.debug {
        &["sched_diff=trace", "sched_workload=trace"]
    } else if args.verbose {
        &["sched_diff=debug"]
    } else {
        &[]
    };
    for directive in directives {
        if let Ok(directive) = Directive::from_str(directive) {
            filter = filter.add_directive(directive);
        }
    }
    // A second initialization (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The captured result of a child process that exited successfully.
#[derive(Debug)]
pub struct CapturedOutput {
    /// The rendered command line, for reporting.
    pub command: String,
    pub stdout: String,
    pub runtime: Duration,
}

/// Contains information about the execution environment and arguments that affect operations.
pub struct DiffSession {
    /// The common command-line arguments
    pub args: CommonArgs,

    /// Drives child processes and their timeouts. Only one child runs at a time.
    runtime: tokio::runtime::Runtime,
}

impl DiffSession {
    pub fn new(args: CommonArgs) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the process runtime")?;
        Ok(DiffSession { args, runtime })
    }

    /// Run a job to completion, capturing its stdout and leaving stderr on the terminal
    /// (unless --quiet). Fails if the job cannot start, exits unsuccessfully, or is still
    /// running after `timeout`, in which case it is killed.
    pub fn run_captured(
        &self,
        cmd: Command,
        timeout: Option<Duration>,
    ) -> Result<CapturedOutput, DiffError> {
        let command = render_command(&cmd).to_string_lossy().into_owned();
        if self.args.is_verbose() {
            println!("[sched-diff] {command}");
        }
        debug!(%command, ?timeout, "run_captured");

        let mut cmd = tokio::process::Command::from(cmd);
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).kill_on_drop(true);
        if self.args.quiet {
            cmd.stderr(Stdio::null());
        }

        let start_time = Instant::now();
        let output = self.runtime.block_on(async {
            let child = cmd
                .spawn()
                .map_err(|source| DiffError::Launch { command: command.clone(), source })?;
            // Dropping the pending future on timeout drops the child, which kills it.
            let output = match timeout {
                Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                    .await
                    .map_err(|_| DiffError::Timeout { command: command.clone(), limit })?,
                None => child.wait_with_output().await,
            };
            output.map_err(|source| DiffError::Capture { command: command.clone(), source })
        })?;
        let runtime = start_time.elapsed();
        debug!(%command, status = %output.status, ?runtime, "run_captured");

        if !output.status.success() {
            return Err(DiffError::Execution { command, status: output.status });
        }
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!(%command, %stdout, "captured_stdout");
        Ok(CapturedOutput { command, stdout, runtime })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn session() -> DiffSession {
        DiffSession::new(CommonArgs { quiet: true, ..Default::default() }).unwrap()
    }

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn check_captures_stdout_only() {
        let out = session().run_captured(sh("echo out; echo err >&2"), None).unwrap();
        assert_eq!(out.stdout, "out\n");
        assert!(out.command.starts_with("sh -c"));
    }

    #[test]
    fn check_non_zero_exit() {
        let err = session().run_captured(sh("echo partial; exit 3"), None).unwrap_err();
        match err {
            DiffError::Execution { status, .. } => assert_eq!(status.code(), Some(3)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn check_missing_executable() {
        let cmd = Command::new("/nonexistent/scheduler");
        let err = session().run_captured(cmd, None).unwrap_err();
        match err {
            DiffError::Launch { command, source } => {
                assert_eq!(command, "/nonexistent/scheduler");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn check_timeout_kills_child() {
        let start = Instant::now();
        let err = session()
            .run_captured(sh("exec sleep 30"), Some(Duration::from_millis(200)))
            .unwrap_err();
        assert!(matches!(err, DiffError::Timeout { .. }), "{err:?}");
        assert!(err.to_string().ends_with("did not finish within 200ms and was killed"), "{err}");
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn check_fast_child_within_timeout() {
        let out = session().run_captured(sh("printf 'a\\nb\\n'"), Some(Duration::from_secs(30))).unwrap();
        assert_eq!(out.stdout, "a\nb\n");
    }
}
