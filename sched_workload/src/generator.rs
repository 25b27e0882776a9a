// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Random workload generation.

use crate::{PidStrategy, ProcessDescriptor, Workload, WorkloadConfig, WorkloadError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, trace};

/// A seed drawn from the thread-local entropy source, for runs that were not given one.
pub fn fresh_seed() -> u64 {
    rand::random()
}

/// Generate one workload from `config` with the given random source.
pub fn generate<R: Rng>(config: &WorkloadConfig, rng: R) -> Result<Workload, WorkloadError> {
    Ok(WorkloadGenerator::new(config.clone(), rng)?.generate())
}

/// Draws workloads from a validated [`WorkloadConfig`].
///
/// The generator keeps no state between calls other than the random source: every call to
/// [`WorkloadGenerator::generate`] starts from an empty set of used pids.
pub struct WorkloadGenerator<R> {
    config: WorkloadConfig,
    rng: R,
}

impl WorkloadGenerator<StdRng> {
    /// A generator whose output is fully determined by `seed`.
    pub fn seeded(config: WorkloadConfig, seed: u64) -> Result<Self, WorkloadError> {
        debug!(seed, "seeded_generator");
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WorkloadGenerator<R> {
    pub fn new(config: WorkloadConfig, rng: R) -> Result<Self, WorkloadError> {
        config.validate()?;
        Ok(WorkloadGenerator { config, rng })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Draw a descriptor count, then that many descriptors.
    pub fn generate(&mut self) -> Workload {
        let count = self.config.count.sample(&mut self.rng);
        self.build(count)
    }

    /// Generate exactly `count` descriptors. `count` must lie within the configured count bounds.
    pub fn generate_with_count(&mut self, count: u32) -> Result<Workload, WorkloadError> {
        if !self.config.count.contains(count) {
            return Err(WorkloadError::InvalidConfig(format!(
                "count {count} is outside {}",
                self.config.count
            )));
        }
        Ok(self.build(count))
    }

    fn build(&mut self, count: u32) -> Workload {
        let Self { config, rng } = self;
        debug!(count, strategy = %config.pid_strategy, "generate_workload");

        // Validation guarantees the pid domain is at least `count` wide, so both strategies
        // always find a fresh pid.
        let mut permutation = match config.pid_strategy {
            PidStrategy::Permutation => {
                let mut domain: Vec<u32> = config.pid.range().collect();
                domain.shuffle(rng);
                domain.into_iter()
            }
            PidStrategy::Rejection => Vec::new().into_iter(),
        };
        let mut used = HashSet::with_capacity(count as usize);

        let mut descriptors = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let pid = match config.pid_strategy {
                PidStrategy::Rejection => loop {
                    let candidate = config.pid.sample(rng);
                    if used.insert(candidate) {
                        break candidate;
                    }
                    trace!(candidate, "pid_collision");
                },
                PidStrategy::Permutation => {
                    permutation.next().expect("pid domain is at least as large as the count")
                }
            };
            descriptors.push(ProcessDescriptor {
                arrival_time: config.arrival_time.sample(rng),
                pid,
                memory_demand: config.memory_demand.sample(rng),
                burst_time: config.burst_time.sample(rng),
            });
        }

        Workload::from_descriptors(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bounds;
    use proptest::prelude::*;

    fn strategy() -> impl Strategy<Value = PidStrategy> {
        prop_oneof![Just(PidStrategy::Rejection), Just(PidStrategy::Permutation)]
    }

    fn assert_well_formed(workload: &Workload, config: &WorkloadConfig) {
        workload.check_invariants(config).unwrap();
        let arrivals: Vec<u32> = workload.iter().map(|d| d.arrival_time).collect();
        assert!(arrivals.windows(2).all(|w| w[0] <= w[1]), "{arrivals:?}");
    }

    proptest! {
        #[test]
        fn generated_workloads_hold_invariants(seed in any::<u64>(), pid_strategy in strategy()) {
            let config = WorkloadConfig { pid_strategy, ..Default::default() };
            let workload = WorkloadGenerator::seeded(config.clone(), seed).unwrap().generate();
            assert_well_formed(&workload, &config);
        }

        #[test]
        fn maximum_count_terminates(seed in any::<u64>(), pid_strategy in strategy()) {
            let config = WorkloadConfig { pid_strategy, ..Default::default() };
            let max = config.count.max();
            let mut generator = WorkloadGenerator::seeded(config.clone(), seed).unwrap();
            let workload = generator.generate_with_count(max).unwrap();
            prop_assert_eq!(workload.len(), max as usize);
            assert_well_formed(&workload, &config);
        }

        #[test]
        fn saturated_pid_domain_uses_every_pid(seed in any::<u64>(), pid_strategy in strategy()) {
            // The pid domain is exactly as wide as the largest count.
            let config = WorkloadConfig {
                count: Bounds::new(0, 6),
                pid: Bounds::new(10, 15),
                pid_strategy,
                ..Default::default()
            };
            let workload = WorkloadGenerator::seeded(config, seed).unwrap().generate_with_count(5).unwrap();
            let mut pids: Vec<u32> = workload.iter().map(|d| d.pid).collect();
            pids.sort_unstable();
            prop_assert_eq!(pids, vec![10, 11, 12, 13, 14]);
        }
    }

    #[test]
    fn check_same_seed_same_workload() {
        let a = WorkloadGenerator::seeded(WorkloadConfig::default(), 42).unwrap().generate();
        let b = WorkloadGenerator::seeded(WorkloadConfig::default(), 42).unwrap().generate();
        assert_eq!(a, b);
    }

    #[test]
    fn check_zero_count() {
        let mut generator = WorkloadGenerator::seeded(WorkloadConfig::default(), 7).unwrap();
        assert!(generator.generate_with_count(0).unwrap().is_empty());
    }

    #[test]
    fn check_count_outside_bounds_rejected() {
        let mut generator = WorkloadGenerator::seeded(WorkloadConfig::default(), 7).unwrap();
        let err = generator.generate_with_count(20).unwrap_err();
        assert!(matches!(err, WorkloadError::InvalidConfig(_)));
    }

    #[test]
    fn check_invalid_config_rejected() {
        let config = WorkloadConfig { pid: Bounds::new(0, 3), ..Default::default() };
        assert!(WorkloadGenerator::seeded(config, 1).is_err());
    }

    #[test]
    fn check_generate_free_function() {
        let workload = generate(&WorkloadConfig::default(), StdRng::seed_from_u64(3)).unwrap();
        workload.check_invariants(&WorkloadConfig::default()).unwrap();
    }
}
