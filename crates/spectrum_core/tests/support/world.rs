#![allow(dead_code)]

use bevy_ecs::prelude::World;
use spectrum_core::band::BandPlan;
use spectrum_core::policy::{ArchitectureChoice, ArchitecturePolicy};
use spectrum_core::request::Request;
use spectrum_core::scenario::{build_world, SchedulerKind, SimulationParams, SimulationSetup};
use spectrum_core::topology::Topology;

/// Fluent builder for test runs on a grid or a hand-built topology.
#[derive(Debug, Clone)]
pub struct TestWorldBuilder {
    params: SimulationParams,
    choice: ArchitectureChoice,
    topology: Option<Topology>,
    requests: Vec<Request>,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self {
            params: SimulationParams::default().with_horizon_minutes(1_440),
            choice: ArchitectureChoice::default(),
            topology: None,
            requests: Vec::new(),
        }
    }

    pub fn with_choice(mut self, choice: ArchitectureChoice) -> Self {
        self.choice = choice;
        self
    }

    pub fn with_band(mut self, band: BandPlan) -> Self {
        self.params = self.params.with_band(band);
        self
    }

    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.params = self.params.with_grid(rows, cols);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_horizon(mut self, minutes: u64) -> Self {
        self.params = self.params.with_horizon_minutes(minutes);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.with_seed(seed);
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.params = self.params.with_scheduler(scheduler);
        self
    }

    pub fn with_params(mut self, f: impl FnOnce(SimulationParams) -> SimulationParams) -> Self {
        self.params = f(self.params);
        self
    }

    pub fn with_requests(mut self, requests: Vec<Request>) -> Self {
        self.requests = requests;
        self
    }

    pub fn setup(self) -> SimulationSetup {
        let policy = ArchitecturePolicy::new(self.choice).expect("feasible architecture");
        match self.topology {
            Some(topology) => {
                SimulationSetup::with_topology(self.params, topology, policy, self.requests)
            }
            None => SimulationSetup::new(self.params, policy, self.requests),
        }
        .expect("valid setup")
    }

    pub fn build(self) -> World {
        build_world(self.setup()).expect("world")
    }
}
