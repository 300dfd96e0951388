//! Run the reference architecture for 180 days of medium demand and print the report.
//!
//! Run with: cargo run -p spectrum_core --example scenario_run

use bevy_ecs::prelude::World;
use spectrum_core::allocation::AllocationEngine;
use spectrum_core::clock::SimulationClock;
use spectrum_core::metrics::MetricsAggregator;
use spectrum_core::policy::{ArchitectureChoice, ArchitecturePolicy, MitigationStrategy};
use spectrum_core::runner::{
    finish_event_run, initialize_simulation, run_until_empty, simulation_schedule,
};
use spectrum_core::scenario::{build_world, SimulationParams, SimulationSetup};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const SEED: u64 = 123;

    let params = SimulationParams::default().with_seed(SEED);
    let horizon = params.horizon_minutes;
    let policy = ArchitecturePolicy::new(
        ArchitectureChoice::default().with_mitigation(MitigationStrategy::PowerControl),
    )?;
    let setup = SimulationSetup::generated(params, policy)?;
    let requests = setup.requests().len();

    let mut world: World = build_world(setup)?;
    initialize_simulation(&mut world);
    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, usize::MAX);
    finish_event_run(&mut world);

    let engine = world.resource::<AllocationEngine>();
    let report = world.resource::<MetricsAggregator>().report(engine, horizon);
    let now = world.resource::<SimulationClock>().now();

    println!("--- Scenario run ({requests} requests, {} days, seed {SEED}) ---", horizon / 1440);
    println!("Architecture: {}", engine.policy().choice());
    println!("Events processed: {steps}");
    println!("Simulation time: {now} min");
    println!(
        "Granted {} / denied {} (blocking {:.3})",
        report.granted, report.denied, report.blocking_probability
    );
    println!(
        "SUE {:.4} (raw {:.4}), coordination cost {:.2}, mean quality {:.3}",
        report.sue, report.raw_sue, report.coordination_cost, report.mean_quality
    );

    println!("\nActive assignments:");
    for a in engine.assignments() {
        println!(
            "  {}  node={} {}  class={}  quality={:.2}  next_check={:?}",
            a.id, a.node, a.interval, a.class, a.quality, a.next_check
        );
    }
    Ok(())
}
