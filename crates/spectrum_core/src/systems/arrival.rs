use bevy_ecs::prelude::{Res, ResMut};
use tracing::warn;

use crate::allocation::AllocationEngine;
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::lifecycle::{schedule_grant_follow_ups, PendingManual, RenewalCalendar};
use crate::metrics::MetricsAggregator;
use crate::request::RequestLedger;
use crate::scenario::SimulationHorizon;
use crate::systems::{deliver, Delivery};

#[allow(clippy::too_many_arguments)]
pub fn arrival_system(
    event: Res<CurrentEvent>,
    horizon: Res<SimulationHorizon>,
    mut clock: ResMut<SimulationClock>,
    mut engine: ResMut<AllocationEngine>,
    mut ledger: ResMut<RequestLedger>,
    mut metrics: ResMut<MetricsAggregator>,
    mut pending: ResMut<PendingManual>,
    mut calendar: ResMut<RenewalCalendar>,
) {
    if event.0.kind != EventKind::Arrival {
        return;
    }
    let Some(id) = event.0.request() else {
        warn!(at = event.0.timestamp, "arrival event without a request");
        return;
    };
    let now = event.0.timestamp;

    match deliver(&mut engine, &mut ledger, &mut metrics, &mut pending, id, now) {
        Some(Delivery::Deferred { process_at }) => {
            if process_at < horizon.0 {
                clock.schedule_at(
                    process_at,
                    EventKind::ProcessManual,
                    Some(EventSubject::Request(id)),
                );
            }
        }
        Some(Delivery::Admitted(report)) => {
            schedule_grant_follow_ups(&report.decision, &mut clock, &mut calendar, horizon.0);
        }
        None => warn!(request = %id, "arrival for unknown request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::band::{BandPlan, DeviceClass};
    use crate::policy::{ArchitectureChoice, LicensingMode};
    use crate::request::{Request, RequestId};
    use crate::test_helpers::world_on_grid;

    fn dispatch(world: &mut bevy_ecs::prelude::World) {
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("event");
        world.insert_resource(CurrentEvent(event));
        let mut schedule = Schedule::default();
        schedule.add_systems(arrival_system);
        schedule.run(world);
    }

    #[test]
    fn periodic_grant_queues_first_renewal() {
        let mut world = world_on_grid(
            ArchitectureChoice::default().with_licensing(LicensingMode::Periodic),
            BandPlan::default(),
            vec![Request::new(0, 5, 0, 40, DeviceClass::Iot)],
            10_000,
        );
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(5, EventKind::Arrival, Some(EventSubject::Request(RequestId(0))));
        dispatch(&mut world);

        assert!(world.resource::<RequestLedger>().get(RequestId(0)).expect("req").is_granted());
        assert!(world.resource::<RenewalCalendar>().is_scheduled(1445));
        let next = world.resource_mut::<SimulationClock>().pop_next().expect("renewal");
        assert_eq!((next.timestamp, next.kind), (1445, EventKind::Renewal));
    }

    #[test]
    fn manual_arrival_is_parked_until_review() {
        let mut world = world_on_grid(
            ArchitectureChoice::default().with_licensing(LicensingMode::Manual),
            BandPlan::default(),
            vec![Request::new(0, 0, 0, 40, DeviceClass::Iot)],
            100_000,
        );
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(0, EventKind::Arrival, Some(EventSubject::Request(RequestId(0))));
        dispatch(&mut world);

        assert_eq!(world.resource::<PendingManual>().len(), 1);
        assert_eq!(world.resource::<MetricsAggregator>().total_requests(), 0);
        let next = world.resource::<SimulationClock>().next_event_time();
        // Centralized review takes 30 days.
        assert_eq!(next, Some(43_200));
    }

    #[test]
    fn review_past_horizon_is_never_queued() {
        let mut world = world_on_grid(
            ArchitectureChoice::default().with_licensing(LicensingMode::Manual),
            BandPlan::default(),
            vec![Request::new(0, 0, 0, 40, DeviceClass::Iot)],
            1_000,
        );
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(0, EventKind::Arrival, Some(EventSubject::Request(RequestId(0))));
        dispatch(&mut world);
        assert!(world.resource::<SimulationClock>().is_empty());
    }
}
