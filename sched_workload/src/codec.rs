// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The workload file format read by the scheduler.
//!
//! One descriptor per line, as four space separated integers:
//! `<arrival_time> <pid> <memory_demand> <burst_time>`. Every line, including the last one, is
//! newline terminated. An empty workload is an empty file.

use crate::{ProcessDescriptor, Workload, WorkloadError};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.arrival_time, self.pid, self.memory_demand, self.burst_time)
    }
}

impl FromStr for ProcessDescriptor {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[arrival_time, pid, memory_demand, burst_time] = fields.as_slice() else {
            return Err(format!("expected 4 fields, found {}", fields.len()));
        };
        let num = |name: &str, value: &str| {
            value.parse::<u32>().map_err(|e| format!("invalid {name} `{value}`: {e}"))
        };
        Ok(ProcessDescriptor {
            arrival_time: num("arrival_time", arrival_time)?,
            pid: num("pid", pid)?,
            memory_demand: num("memory_demand", memory_demand)?,
            burst_time: num("burst_time", burst_time)?,
        })
    }
}

impl Workload {
    /// Serialize in file order.
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for descriptor in self {
            writeln!(out, "{descriptor}")?;
        }
        out.flush()
    }

    pub fn to_text(&self) -> String {
        self.iter().map(|d| format!("{d}\n")).collect()
    }

    /// Create or truncate `path` and write the workload to it.
    pub fn write(&self, path: &Path) -> Result<(), WorkloadError> {
        debug!(path = %path.display(), descriptors = self.len(), "write_workload");
        let to_error = |source| WorkloadError::Write { path: path.to_owned(), source };
        let file = File::create(path).map_err(to_error)?;
        self.write_to(BufWriter::new(file)).map_err(to_error)
    }

    /// Parse the text of a workload file. Blank lines are skipped.
    ///
    /// Descriptors are re-sorted by arrival time, so an unsorted file still yields a well
    /// ordered workload. Use [`Workload::check_invariants`] to validate the values themselves.
    pub fn parse(text: &str) -> Result<Workload, WorkloadError> {
        let descriptors = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                line.parse::<ProcessDescriptor>()
                    .map_err(|reason| WorkloadError::Parse { line: idx + 1, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Workload::from_descriptors(descriptors))
    }

    pub fn read(path: &Path) -> Result<Workload, WorkloadError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| WorkloadError::Read { path: path.to_owned(), source })?;
        Workload::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WorkloadConfig, WorkloadGenerator};
    use proptest::prelude::*;

    #[test]
    fn check_line_format() {
        let w = Workload::from_descriptors(vec![
            ProcessDescriptor { arrival_time: 20, pid: 2, memory_demand: 30, burst_time: 15 },
            ProcessDescriptor { arrival_time: 10, pid: 1, memory_demand: 50, burst_time: 20 },
        ]);
        assert_eq!(w.to_text(), "10 1 50 20\n20 2 30 15\n");
    }

    #[test]
    fn check_empty_workload_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchmark-cm.txt");
        std::fs::write(&path, "stale contents\n").unwrap();
        Workload::default().write(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        assert!(Workload::read(&path).unwrap().is_empty());
    }

    #[test]
    fn check_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.txt");
        std::fs::write(&path, "1 2 3 4\n5 6 7 8\n9 10 11 12\n").unwrap();
        let w = Workload::parse("3 0 1 1\n").unwrap();
        w.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3 0 1 1\n");
    }

    #[test]
    fn check_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("w.txt");
        let err = Workload::default().write(&path).unwrap_err();
        assert!(matches!(err, WorkloadError::Write { .. }), "{err:?}");
    }

    #[test]
    fn check_parse_errors() {
        let err = Workload::parse("10 1 50 20\n\n20 2 x 15\n").unwrap_err();
        match err {
            WorkloadError::Parse { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("memory_demand"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        let err = Workload::parse("10 1 50\n").unwrap_err();
        assert_eq!(err.to_string(), "line 1: expected 4 fields, found 3");
    }

    #[test]
    fn check_parse_sorts() {
        let w = Workload::parse("20 2 30 15\n10 1 50 20\n").unwrap();
        assert_eq!(w.to_text(), "10 1 50 20\n20 2 30 15\n");
    }

    proptest! {
        #[test]
        fn written_file_parses_back(seed in any::<u64>()) {
            let config = WorkloadConfig::default();
            let workload = WorkloadGenerator::seeded(config, seed).unwrap().generate();
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("benchmark-cm.txt");
            workload.write(&path).unwrap();

            let text = std::fs::read_to_string(&path).unwrap();
            prop_assert_eq!(text.lines().count(), workload.len());

            let mut written: Vec<ProcessDescriptor> = workload.descriptors().to_vec();
            let mut parsed: Vec<ProcessDescriptor> = Workload::read(&path).unwrap().descriptors().to_vec();
            written.sort();
            parsed.sort();
            prop_assert_eq!(written, parsed);
        }
    }
}
