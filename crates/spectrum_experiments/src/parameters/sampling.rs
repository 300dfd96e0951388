use super::{ParameterSet, ParameterSpace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashSet;

impl ParameterSpace {
    /// Generate random parameter sets (Monte Carlo sampling).
    ///
    /// Draws each dimension independently and skips duplicates, so fewer than
    /// `count` sets come back when the space is smaller than `count`.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let mut rng = StdRng::seed_from_u64(seed);
        let architectures = self.architecture_values();
        let demand = self.demand_values();
        let schedulers = self.scheduler_values();
        let horizons = self.horizon_values();

        let target = count.min(self.len());
        let mut parameter_sets = Vec::with_capacity(target);
        let mut seen = HashSet::new();
        let mut attempts = 0;
        const MAX_ATTEMPTS: usize = 10_000;

        while parameter_sets.len() < target && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let (Some(&architecture), Some(&scenario), Some(&scheduler), Some(&horizon)) = (
                architectures.choose(&mut rng),
                demand.choose(&mut rng),
                schedulers.choose(&mut rng),
                horizons.choose(&mut rng),
            ) else {
                break;
            };
            let replication = rng.gen_range(0..self.replications);
            if !seen.insert((architecture, scenario, scheduler, horizon, replication)) {
                continue;
            }
            let mut set = self.make_set(architecture, scenario, scheduler, horizon, replication);
            set.run_id = parameter_sets.len();
            parameter_sets.push(set);
        }

        parameter_sets
    }
}
