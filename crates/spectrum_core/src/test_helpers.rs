//! Test helpers for common world setup.
//!
//! Shared by unit tests, integration tests and benches.

use bevy_ecs::prelude::World;

use crate::band::BandPlan;
use crate::policy::{ArchitectureChoice, ArchitecturePolicy};
use crate::request::Request;
use crate::scenario::{blind_spot_setup, build_world, SimulationParams, SimulationSetup};

/// Policy for a choice that is known to be feasible.
///
/// # Panics
///
/// Panics if `choice` violates a feasibility rule.
pub fn policy(choice: ArchitectureChoice) -> ArchitecturePolicy {
    ArchitecturePolicy::new(choice).expect("test architecture should be feasible")
}

/// Setup on the default 3x3 grid with default params apart from band and horizon.
///
/// # Panics
///
/// Panics if the choice is infeasible or the requests are invalid.
pub fn setup_on_grid(
    choice: ArchitectureChoice,
    band: BandPlan,
    requests: Vec<Request>,
    horizon: u64,
) -> SimulationSetup {
    let params = SimulationParams::default()
        .with_band(band)
        .with_horizon_minutes(horizon);
    SimulationSetup::new(params, policy(choice), requests).expect("test setup should be valid")
}

/// World built from [setup_on_grid], with every resource the systems expect.
///
/// # Panics
///
/// Panics if the setup is invalid.
pub fn world_on_grid(
    choice: ArchitectureChoice,
    band: BandPlan,
    requests: Vec<Request>,
    horizon: u64,
) -> World {
    build_world(setup_on_grid(choice, band, requests, horizon)).expect("test world should build")
}

/// World for the three-node blind spot layout.
///
/// # Panics
///
/// Panics if the built-in setup stops validating.
pub fn blind_spot_world() -> World {
    let setup = blind_spot_setup().expect("blind spot setup should be valid");
    build_world(setup).expect("blind spot world should build")
}
