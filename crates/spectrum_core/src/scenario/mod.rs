//! Scenario setup: run parameters, input validation and world construction.

mod build;
mod params;

pub use build::{blind_spot_setup, build_world, SimulationSetup};
pub use params::{
    ManualBatchInterval, SchedulerKind, SimulationHorizon, SimulationParams,
    DEFAULT_HORIZON_MINUTES, DEFAULT_SEED,
};
