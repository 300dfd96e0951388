use bevy_ecs::prelude::{Res, ResMut};

use crate::allocation::AllocationEngine;
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::lifecycle::RenewalCalendar;
use crate::metrics::MetricsAggregator;
use crate::scenario::SimulationHorizon;

/// Renewal pass at an instant where at least one next check is due.
///
/// Leases ending at this instant are dropped first, matching the tick order
/// (expiry before renewal).
pub fn renewal_system(
    event: Res<CurrentEvent>,
    horizon: Res<SimulationHorizon>,
    mut clock: ResMut<SimulationClock>,
    mut engine: ResMut<AllocationEngine>,
    mut metrics: ResMut<MetricsAggregator>,
    mut calendar: ResMut<RenewalCalendar>,
) {
    if event.0.kind != EventKind::Renewal {
        return;
    }
    let now = event.0.timestamp;
    calendar.complete(now);
    engine.expire_due(now);

    let report = engine.renew(now);
    metrics.record_renewal(&report, engine.policy());

    for id in &report.renewed {
        if let Some(next) = engine.store().get(*id).and_then(|a| a.next_check) {
            calendar.ensure(&mut clock, next, horizon.0);
        }
    }
}
