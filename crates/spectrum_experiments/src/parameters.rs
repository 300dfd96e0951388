//! Experiment parameter space: architectures × demand scenarios × schedulers ×
//! horizons × replications.
//!
//! Supports grid search (Cartesian product) and random sampling. Replication
//! seeds depend only on the replication index, so every architecture in a
//! sweep faces the same demand stream.

use spectrum_core::demand::DemandScenario;
use spectrum_core::error::ConfigResult;
use spectrum_core::policy::{ArchitectureChoice, ArchitecturePolicy, MINUTES_PER_DAY};
use spectrum_core::scenario::{SchedulerKind, SimulationParams, SimulationSetup};

use crate::morphology::enumerate_architectures;

mod sampling;
#[cfg(test)]
mod tests;

/// Seed stride between replications.
const REPLICATION_SEED_STRIDE: u64 = 0x9e37_79b9;

/// A single run configuration plus the metadata needed to reproduce it.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// Run parameters before the replication seed is applied.
    pub params: SimulationParams,
    pub architecture: ArchitectureChoice,
    /// Stable label for this configuration, shared by its replications.
    pub experiment_id: String,
    /// Position in the generated sweep.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(
        params: SimulationParams,
        architecture: ArchitectureChoice,
        experiment_id: String,
        run_id: usize,
        seed: u64,
    ) -> Self {
        Self {
            params,
            architecture,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Run parameters with the replication seed applied.
    pub fn simulation_params(&self) -> SimulationParams {
        self.params.clone().with_seed(self.seed)
    }

    /// Validated setup with generated demand. Fails on infeasible architectures.
    pub fn setup(&self) -> ConfigResult<SimulationSetup> {
        let policy = ArchitecturePolicy::new(self.architecture)?;
        SimulationSetup::generated(self.simulation_params(), policy)
    }
}

/// Defines a parameter space for exploration.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    /// Defaults for every dimension left unspecified.
    base: SimulationParams,
    architectures: Vec<ArchitectureChoice>,
    demand: Vec<DemandScenario>,
    schedulers: Vec<SchedulerKind>,
    horizon_days: Vec<u64>,
    replications: usize,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: SimulationParams::default(),
            architectures: vec![],
            demand: vec![],
            schedulers: vec![],
            horizon_days: vec![],
            replications: 1,
        }
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    /// Every feasible architecture of the morphology.
    pub fn feasible_architectures() -> Self {
        Self::new().architectures(enumerate_architectures(true))
    }

    pub fn with_base(mut self, base: SimulationParams) -> Self {
        self.base = base;
        self
    }

    pub fn architectures(mut self, architectures: Vec<ArchitectureChoice>) -> Self {
        self.architectures = architectures;
        self
    }

    pub fn demand(mut self, scenarios: Vec<DemandScenario>) -> Self {
        self.demand = scenarios;
        self
    }

    pub fn scheduler(mut self, schedulers: Vec<SchedulerKind>) -> Self {
        self.schedulers = schedulers;
        self
    }

    pub fn horizon_days(mut self, days: Vec<u64>) -> Self {
        self.horizon_days = days;
        self
    }

    /// Independent demand draws per configuration. Zero is treated as one.
    pub fn replications(mut self, count: usize) -> Self {
        self.replications = count.max(1);
        self
    }

    pub fn base(&self) -> &SimulationParams {
        &self.base
    }

    fn architecture_values(&self) -> Vec<ArchitectureChoice> {
        if self.architectures.is_empty() {
            vec![ArchitectureChoice::default()]
        } else {
            self.architectures.clone()
        }
    }

    fn demand_values(&self) -> Vec<DemandScenario> {
        if self.demand.is_empty() {
            vec![self.base.demand]
        } else {
            self.demand.clone()
        }
    }

    fn scheduler_values(&self) -> Vec<SchedulerKind> {
        if self.schedulers.is_empty() {
            vec![self.base.scheduler]
        } else {
            self.schedulers.clone()
        }
    }

    /// Horizons in minutes.
    fn horizon_values(&self) -> Vec<u64> {
        if self.horizon_days.is_empty() {
            vec![self.base.horizon_minutes]
        } else {
            self.horizon_days
                .iter()
                .map(|days| days * MINUTES_PER_DAY)
                .collect()
        }
    }

    fn replication_seed(&self, replication: usize) -> u64 {
        self.base
            .seed
            .wrapping_add((replication as u64).wrapping_mul(REPLICATION_SEED_STRIDE))
    }

    /// Builds one parameter set; `run_id` is filled in by the caller.
    fn make_set(
        &self,
        architecture: ArchitectureChoice,
        demand: DemandScenario,
        scheduler: SchedulerKind,
        horizon_minutes: u64,
        replication: usize,
    ) -> ParameterSet {
        let params = self
            .base
            .clone()
            .with_demand(demand)
            .with_scheduler(scheduler)
            .with_horizon_minutes(horizon_minutes);
        let experiment_id = format!(
            "{}-{}-{}-{}d",
            architecture.short_id(),
            demand,
            scheduler,
            horizon_minutes / MINUTES_PER_DAY
        );
        ParameterSet::new(
            params,
            architecture,
            experiment_id,
            0,
            self.replication_seed(replication),
        )
    }

    /// Generate all parameter combinations (grid search), in dimension order
    /// with replications innermost.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let architectures = self.architecture_values();
        let demand = self.demand_values();
        let schedulers = self.scheduler_values();
        let horizons = self.horizon_values();

        let mut sets = Vec::with_capacity(
            architectures.len() * demand.len() * schedulers.len() * horizons.len() * self.replications,
        );
        for &architecture in &architectures {
            for &scenario in &demand {
                for &scheduler in &schedulers {
                    for &horizon in &horizons {
                        for replication in 0..self.replications {
                            let mut set =
                                self.make_set(architecture, scenario, scheduler, horizon, replication);
                            set.run_id = sets.len();
                            sets.push(set);
                        }
                    }
                }
            }
        }
        sets
    }

    /// Number of sets `generate` would return.
    pub fn len(&self) -> usize {
        self.architecture_values().len()
            * self.demand_values().len()
            * self.scheduler_values().len()
            * self.horizon_values().len()
            * self.replications
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
