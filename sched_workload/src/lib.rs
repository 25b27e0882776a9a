// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process workloads consumed by the scheduler under test.
//!
//! A [`Workload`] is the ordered set of [`ProcessDescriptor`]s for one test run. It is built by
//! the [`WorkloadGenerator`], persisted with [`Workload::write`] and read back by the driver
//! through [`Workload::read`]. The file on disk is the only handoff between the two.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub use bounds::{Bounds, PidStrategy, WorkloadConfig};
pub use generator::{WorkloadGenerator, fresh_seed, generate};

mod bounds;
mod codec;
mod generator;

/// One simulated process, as the scheduler reads it from its input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// When the process becomes available.
    pub arrival_time: u32,
    /// Process id. Unique within one workload.
    pub pid: u32,
    /// Memory the process needs, as understood by the scheduler's memory mode.
    pub memory_demand: u32,
    /// Total CPU time required.
    pub burst_time: u32,
}

/// The descriptors of one run, always ordered by non-decreasing arrival time.
///
/// Descriptors that share an arrival time keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    descriptors: Vec<ProcessDescriptor>,
}

impl Workload {
    /// Build a workload, sorting the descriptors by arrival time (stable).
    pub fn from_descriptors(mut descriptors: Vec<ProcessDescriptor>) -> Self {
        descriptors.sort_by_key(|d| d.arrival_time);
        Workload { descriptors }
    }

    pub fn descriptors(&self) -> &[ProcessDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessDescriptor> {
        self.descriptors.iter()
    }

    /// Check the workload invariants against the given bounds.
    ///
    /// Generated workloads always pass. Hand-written input files may not, which is why the
    /// driver calls this before handing a file to the scheduler.
    pub fn check_invariants(&self, config: &WorkloadConfig) -> Result<(), WorkloadError> {
        let mut pids = HashSet::with_capacity(self.len());
        for (idx, d) in self.descriptors.iter().enumerate() {
            if !pids.insert(d.pid) {
                return Err(WorkloadError::Invariant(format!(
                    "pid {} is used more than once (entry {})",
                    d.pid,
                    idx + 1
                )));
            }
            let fields = [
                ("arrival_time", d.arrival_time, config.arrival_time),
                ("pid", d.pid, config.pid),
                ("memory_demand", d.memory_demand, config.memory_demand),
                ("burst_time", d.burst_time, config.burst_time),
            ];
            for (name, value, bounds) in fields {
                if !bounds.contains(value) {
                    return Err(WorkloadError::Invariant(format!(
                        "{name} {value} of pid {} is outside {bounds}",
                        d.pid
                    )));
                }
            }
        }
        if !config.count.contains(self.len() as u32) {
            return Err(WorkloadError::Invariant(format!(
                "{} descriptors is outside {}",
                self.len(),
                config.count
            )));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Workload {
    type Item = &'a ProcessDescriptor;
    type IntoIter = std::slice::Iter<'a, ProcessDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// The workload file could not be created or written.
    #[error("failed to write workload file `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The workload file could not be opened or read.
    #[error("failed to read workload file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("invalid workload configuration: {0}")]
    InvalidConfig(String),
    #[error("workload invariant violated: {0}")]
    Invariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(arrival_time: u32, pid: u32) -> ProcessDescriptor {
        ProcessDescriptor { arrival_time, pid, memory_demand: 10, burst_time: 5 }
    }

    #[test]
    fn check_sort_is_stable() {
        let w = Workload::from_descriptors(vec![desc(30, 1), desc(10, 2), desc(30, 3), desc(10, 4)]);
        let pids: Vec<u32> = w.iter().map(|d| d.pid).collect();
        assert_eq!(pids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn check_duplicate_pid_rejected() {
        let w = Workload::from_descriptors(vec![desc(1, 7), desc(2, 7)]);
        let err = w.check_invariants(&WorkloadConfig::default()).unwrap_err();
        assert!(matches!(err, WorkloadError::Invariant(_)), "{err:?}");
    }

    #[test]
    fn check_out_of_bounds_field_rejected() {
        let mut d = desc(1, 3);
        d.memory_demand = 0;
        let err =
            Workload::from_descriptors(vec![d]).check_invariants(&WorkloadConfig::default());
        assert!(err.unwrap_err().to_string().contains("memory_demand 0"));
    }

    #[test]
    fn check_empty_workload_is_valid() {
        assert!(Workload::default().check_invariants(&WorkloadConfig::default()).is_ok());
    }
}
