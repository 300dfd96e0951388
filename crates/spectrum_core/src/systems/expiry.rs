use bevy_ecs::prelude::{Res, ResMut};
use tracing::warn;

use crate::allocation::AllocationEngine;
use crate::clock::{CurrentEvent, EventKind};

pub fn expiry_system(event: Res<CurrentEvent>, mut engine: ResMut<AllocationEngine>) {
    if event.0.kind != EventKind::Expiry {
        return;
    }
    let Some(id) = event.0.assignment() else {
        warn!(at = event.0.timestamp, "expiry event without an assignment");
        return;
    };
    // Already revoked or preempted assignments are fine to skip.
    engine.expire(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Mut, Schedule, World};

    use crate::band::{BandPlan, DeviceClass};
    use crate::clock::{EventSubject, SimulationClock};
    use crate::policy::{AllocationPlan, ArchitectureChoice};
    use crate::request::{Request, RequestId, RequestLedger};
    use crate::test_helpers::world_on_grid;

    fn expire(world: &mut World, id: crate::assignment::AssignmentId) {
        let event = world.resource_mut::<SimulationClock>().schedule_at(
            30,
            EventKind::Expiry,
            Some(EventSubject::Assignment(id)),
        );
        world.insert_resource(CurrentEvent(event));
        let mut schedule = Schedule::default();
        schedule.add_systems(expiry_system);
        schedule.run(world);
    }

    #[test]
    fn expiry_removes_assignment_once() {
        let mut world = world_on_grid(
            ArchitectureChoice::default().with_allocation(AllocationPlan::LargeBlocks),
            BandPlan::default(),
            vec![Request::new(0, 0, 0, 100, DeviceClass::FiveG).with_hold(30)],
            10_000,
        );
        let id = world.resource_scope(|world, mut ledger: Mut<RequestLedger>| {
            let request = ledger.get_mut(RequestId(0)).expect("request");
            world
                .resource_mut::<AllocationEngine>()
                .admit(request, 0)
                .granted()
                .expect("granted")
        });

        expire(&mut world, id);
        assert!(world.resource::<AllocationEngine>().store().is_empty());
        expire(&mut world, id);
        assert!(world.resource::<AllocationEngine>().store().is_consistent(
            world.resource::<AllocationEngine>().topology()
        ));
    }
}
