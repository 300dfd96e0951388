mod support;

use spectrum_core::allocation::AllocationEngine;
use spectrum_core::band::DeviceClass;
use spectrum_core::metrics::{interfering_assignments, MetricsAggregator};
use spectrum_core::runner::{run_simulation_with, run_ticks, tick_schedule};
use spectrum_core::scenario::{blind_spot_setup, SchedulerKind};
use spectrum_core::test_helpers::blind_spot_world;
use support::schedule::ScheduleRunner;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn decentralized_scope_leaves_non_neighbor_conflict_unresolved() {
    let outcome = run_simulation_with(blind_spot_setup().expect("setup"), SchedulerKind::Event)
        .expect("run");

    assert_eq!(outcome.report.total_requests, 3);
    assert_eq!(outcome.report.denied, 0);
    assert_eq!(outcome.report.interfering_assignments, 2);
    assert!(approx(outcome.report.interference_rate, 2.0 / 3.0));

    for assignment in &outcome.assignments {
        let expected = match assignment.class {
            DeviceClass::Iot => 0.4225,
            _ => 0.65,
        };
        assert!(
            approx(assignment.quality, expected),
            "{} has quality {}",
            assignment.class,
            assignment.quality
        );
    }
}

#[test]
fn blind_spot_pair_is_the_two_far_nodes() {
    let mut world = blind_spot_world();
    let mut runner = ScheduleRunner::new();
    runner.prime(&mut world);
    runner.run_full(&mut world);

    let engine = world.resource::<AllocationEngine>();
    let interfering: Vec<_> = interfering_assignments(engine)
        .into_iter()
        .filter_map(|id| engine.store().get(id).map(|a| a.node.0))
        .collect();
    assert_eq!(interfering, vec![0, 2]);
    assert!(engine.store().is_consistent(engine.topology()));
}

#[test]
fn tick_scheduler_reaches_the_same_blind_spot() {
    let mut world = blind_spot_world();
    let mut schedule = tick_schedule();
    assert_eq!(run_ticks(&mut world, &mut schedule), 1_440);

    let engine = world.resource::<AllocationEngine>();
    assert_eq!(interfering_assignments(engine).len(), 2);
    assert_eq!(world.resource::<MetricsAggregator>().integrated_minutes(), 1_440);
}
