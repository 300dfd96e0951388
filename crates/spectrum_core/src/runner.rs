//! Simulation runners: advance time and route work into the ECS.
//!
//! The event runner pops the next event from [SimulationClock], integrates usage
//! over the elapsed interval, inserts the event as [CurrentEvent] and runs the
//! schedule. The tick runner runs a fixed housekeeping chain once per minute.
//! Both share the allocation engine, so allocation outcomes do not depend on
//! the strategy.

use bevy_ecs::prelude::{Mut, Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;
use serde::Serialize;
use tracing::info;

use crate::allocation::AllocationEngine;
use crate::assignment::Assignment;
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::error::ConfigResult;
use crate::lifecycle::TickClock;
use crate::metrics::{MetricsAggregator, MetricsReport};
use crate::request::{Request, RequestLedger};
use crate::scenario::{build_world, SchedulerKind, SimulationHorizon, SimulationSetup};
use crate::systems::{
    arrival::arrival_system,
    expiry::expiry_system,
    manual::process_manual_system,
    renewal::renewal_system,
    tick::{
        tick_arrival_system, tick_expiry_system, tick_manual_batch_system, tick_renewal_system,
        tick_usage_system,
    },
};

fn is_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Arrival)
        .unwrap_or(false)
}

fn is_process_manual(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ProcessManual)
        .unwrap_or(false)
}

fn is_renewal(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Renewal)
        .unwrap_or(false)
}

fn is_expiry(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Expiry)
        .unwrap_or(false)
}

/// Event-driven schedule: one system per event kind, gated on the current event.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        arrival_system.run_if(is_arrival),
        process_manual_system.run_if(is_process_manual),
        renewal_system.run_if(is_renewal),
        expiry_system.run_if(is_expiry),
    ));
    schedule
}

/// Fixed-tick schedule, in per-tick order.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            tick_arrival_system,
            tick_expiry_system,
            tick_renewal_system,
            tick_manual_batch_system,
            tick_usage_system,
        )
            .chain(),
    );
    schedule
}

fn horizon(world: &World) -> u64 {
    world
        .get_resource::<SimulationHorizon>()
        .map(|h| h.0)
        .unwrap_or(u64::MAX)
}

/// Accumulates usage from the last integrated instant up to `until`.
fn integrate_until(world: &mut World, until: u64) {
    world.resource_scope(|world, mut metrics: Mut<MetricsAggregator>| {
        let engine = world.resource::<AllocationEngine>();
        let dt = until.saturating_sub(metrics.integrated_minutes());
        metrics.integrate(engine.store(), engine.topology(), engine.policy(), dt);
    });
}

/// Queues one `Arrival` per request that arrives before the horizon.
/// Call after [build_world] and before running events.
pub fn initialize_simulation(world: &mut World) {
    let end = horizon(world);
    let arrivals: Vec<_> = world
        .resource::<RequestLedger>()
        .iter()
        .filter(|r| r.arrival < end)
        .map(|r| (r.arrival, r.id))
        .collect();
    let mut clock = world.resource_mut::<SimulationClock>();
    for (at, id) in arrivals {
        clock.schedule_at(at, EventKind::Arrival, Some(EventSubject::Request(id)));
    }
}

/// Runs one simulation step: integrates usage up to the next event, pops it, inserts it as
/// [CurrentEvent] and runs the schedule. Returns `false` when the clock is empty or the next
/// event is at or past [SimulationHorizon].
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let stop_at = horizon(world);
    let Some(ts) = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time())
    else {
        return false;
    };
    if ts >= stop_at {
        return false;
    }

    integrate_until(world, ts);
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Integrates the final partial interval and moves the clock to the horizon.
pub fn finish_event_run(world: &mut World) {
    let end = horizon(world);
    if end == u64::MAX {
        return;
    }
    integrate_until(world, end);
    world.resource_mut::<SimulationClock>().advance_to(end);
}

/// Runs the tick chain for every minute from the current tick up to the horizon.
/// Returns the number of ticks executed.
pub fn run_ticks(world: &mut World, schedule: &mut Schedule) -> u64 {
    let end = horizon(world);
    let mut ticks = 0;
    while world.resource::<TickClock>().now < end {
        schedule.run(world);
        world.resource_mut::<TickClock>().now += 1;
        ticks += 1;
    }
    ticks
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub scheduler: SchedulerKind,
    pub report: MetricsReport,
    /// Final active set, in id order.
    pub assignments: Vec<Assignment>,
    pub requests: Vec<Request>,
}

/// Builds the world, runs the scheduler chosen in the setup's params and collects the outcome.
pub fn run_simulation(setup: SimulationSetup) -> ConfigResult<SimulationOutcome> {
    let scheduler = setup.params().scheduler;
    run_simulation_with(setup, scheduler)
}

pub fn run_simulation_with(
    setup: SimulationSetup,
    scheduler: SchedulerKind,
) -> ConfigResult<SimulationOutcome> {
    let mut world = build_world(setup)?;
    let steps = match scheduler {
        SchedulerKind::Event => {
            initialize_simulation(&mut world);
            let mut schedule = simulation_schedule();
            let steps = run_until_empty(&mut world, &mut schedule, usize::MAX);
            finish_event_run(&mut world);
            steps as u64
        }
        SchedulerKind::Tick => {
            let mut schedule = tick_schedule();
            run_ticks(&mut world, &mut schedule)
        }
    };
    Ok(collect_outcome(world, scheduler, steps))
}

fn collect_outcome(mut world: World, scheduler: SchedulerKind, steps: u64) -> SimulationOutcome {
    let end = horizon(&world);
    let engine = world.resource::<AllocationEngine>();
    let report = world.resource::<MetricsAggregator>().report(engine, end);
    let assignments = engine.assignments().cloned().collect();
    let policy = engine.policy().choice().to_string();
    let requests = world
        .remove_resource::<RequestLedger>()
        .map(RequestLedger::into_requests)
        .unwrap_or_default();

    info!(
        %scheduler,
        architecture = %policy,
        steps,
        total = report.total_requests,
        denied = report.denied,
        active = report.total_active_users,
        sue = report.sue,
        "simulation finished"
    );

    SimulationOutcome {
        scheduler,
        report,
        assignments,
        requests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::DeviceClass;
    use crate::policy::{AllocationPlan, ArchitectureChoice, ArchitecturePolicy, LicensingMode};
    use crate::scenario::SimulationParams;

    fn setup(choice: ArchitectureChoice, requests: Vec<Request>, horizon: u64) -> SimulationSetup {
        SimulationSetup::new(
            SimulationParams::default().with_horizon_minutes(horizon),
            ArchitecturePolicy::new(choice).expect("feasible"),
            requests,
        )
        .expect("setup")
    }

    #[test]
    fn event_run_stops_before_horizon_and_flushes() {
        let choice = ArchitectureChoice::default()
            .with_licensing(LicensingMode::Periodic)
            .with_allocation(AllocationPlan::LargeBlocks);
        let requests = vec![
            Request::new(0, 0, 5, 100, DeviceClass::FiveG),
            Request::new(1, 5_000, 5, 100, DeviceClass::FiveG),
        ];
        let outcome =
            run_simulation_with(setup(choice, requests, 3_000), SchedulerKind::Event).expect("run");

        // The second arrival is past the horizon and never counted.
        assert_eq!(outcome.report.total_requests, 1);
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(outcome.requests[1].outcome, crate::request::RequestOutcome::Pending);
        // 200 MHz block on an interior 4-cell node for the whole run, over 600 MHz x 9 cells.
        let expected = (200.0 * 4.0) / (600.0 * 9.0);
        assert!((outcome.report.sue - expected).abs() < 1e-9);
        // Renewed at 1440 and 2880.
        assert_eq!(outcome.assignments[0].next_check, Some(4320));
    }

    #[test]
    fn tick_run_covers_every_minute() {
        let choice = ArchitectureChoice::default().with_allocation(AllocationPlan::LargeBlocks);
        let requests = vec![Request::new(0, 10, 5, 100, DeviceClass::FiveG)];
        let outcome =
            run_simulation_with(setup(choice, requests, 100), SchedulerKind::Tick).expect("run");
        let expected = (200.0 * 4.0 * 90.0) / (600.0 * 9.0 * 100.0);
        assert!((outcome.report.sue - expected).abs() < 1e-9);
    }

    #[test]
    fn horizon_stop_leaves_later_events_queued() {
        let choice = ArchitectureChoice::default().with_licensing(LicensingMode::Periodic);
        let requests = vec![Request::new(0, 0, 0, 40, DeviceClass::Iot)];
        let mut world = build_world(setup(choice, requests, 1_000)).expect("world");
        initialize_simulation(&mut world);
        let mut schedule = simulation_schedule();
        assert_eq!(run_until_empty(&mut world, &mut schedule, 100), 1);
        finish_event_run(&mut world);
        assert_eq!(world.resource::<SimulationClock>().now(), 1_000);
        assert_eq!(world.resource::<MetricsAggregator>().integrated_minutes(), 1_000);
    }
}
