#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use spectrum_core::runner::{
    finish_event_run, initialize_simulation, run_next_event, run_ticks, run_until_empty,
    simulation_schedule, tick_schedule,
};

/// Helper that owns a reusable event `Schedule` so tests can step or drain the queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Queues the arrivals of a freshly built world.
    pub fn prime(&mut self, world: &mut World) {
        initialize_simulation(world);
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    pub fn run_until_empty(&mut self, world: &mut World, max_steps: usize) -> usize {
        run_until_empty(world, &mut self.schedule, max_steps)
    }

    /// Drain to the horizon and flush usage, like a full event run.
    pub fn run_full(&mut self, world: &mut World) -> usize {
        let steps = self.run_until_empty(world, usize::MAX);
        finish_event_run(world);
        steps
    }
}

/// Runs the tick chain up to the horizon.
pub fn run_all_ticks(world: &mut World) -> u64 {
    let mut schedule = tick_schedule();
    run_ticks(world, &mut schedule)
}
