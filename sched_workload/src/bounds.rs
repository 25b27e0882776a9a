// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::WorkloadError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A half-open integer range `[lower, upper)` a generated value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: u32,
    pub upper: u32,
}

impl Bounds {
    pub const fn new(lower: u32, upper: u32) -> Self {
        Bounds { lower, upper }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.range().contains(&value)
    }

    /// Number of distinct values in the range.
    pub fn len(&self) -> u32 {
        self.upper.saturating_sub(self.lower)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<u32> {
        self.lower..self.upper
    }

    /// Largest value in the range. Only meaningful for non-empty bounds.
    pub fn max(&self) -> u32 {
        self.upper.saturating_sub(1)
    }

    /// Draw a value uniformly. Panics on empty bounds, which validation rules out.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.range())
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}

/// How unique pids are drawn for one workload.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumString
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PidStrategy {
    /// Redraw a pid until an unused one comes up.
    #[default]
    Rejection,
    /// Take pids from a shuffled permutation of the pid domain.
    Permutation,
}

/// The bounds table for one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Number of descriptors in the workload.
    pub count: Bounds,
    pub arrival_time: Bounds,
    pub pid: Bounds,
    pub memory_demand: Bounds,
    pub burst_time: Bounds,
    pub pid_strategy: PidStrategy,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            count: Bounds::new(0, 20),
            arrival_time: Bounds::new(0, 100),
            pid: Bounds::new(0, 20),
            memory_demand: Bounds::new(1, 100),
            burst_time: Bounds::new(1, 100),
            pid_strategy: PidStrategy::default(),
        }
    }
}

impl WorkloadConfig {
    /// Check that every field can be drawn from and that unique pids always exist.
    ///
    /// Pid rejection sampling terminates because the pid domain holds at least as many values
    /// as the largest descriptor count. That assumption is checked here once, not in the
    /// sampling loop.
    pub fn validate(&self) -> Result<(), WorkloadError> {
        let fields = [
            ("count", self.count),
            ("arrival_time", self.arrival_time),
            ("pid", self.pid),
            ("memory_demand", self.memory_demand),
            ("burst_time", self.burst_time),
        ];
        for (name, bounds) in fields {
            if bounds.is_empty() {
                return Err(WorkloadError::InvalidConfig(format!(
                    "{name} bounds {bounds} are empty"
                )));
            }
        }
        if self.count.max() > self.pid.len() {
            return Err(WorkloadError::InvalidConfig(format!(
                "pid domain {} holds {} values, fewer than the maximum count of {}",
                self.pid,
                self.pid.len(),
                self.count.max()
            )));
        }
        Ok(())
    }
}
