use bevy_ecs::prelude::{Res, ResMut};
use tracing::warn;

use crate::allocation::AllocationEngine;
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::lifecycle::{schedule_grant_follow_ups, PendingManual, RenewalCalendar};
use crate::metrics::MetricsAggregator;
use crate::request::RequestLedger;
use crate::scenario::SimulationHorizon;
use crate::systems::admit_request;

/// Human review of one manual request completes at its exact process time.
#[allow(clippy::too_many_arguments)]
pub fn process_manual_system(
    event: Res<CurrentEvent>,
    horizon: Res<SimulationHorizon>,
    mut clock: ResMut<SimulationClock>,
    mut engine: ResMut<AllocationEngine>,
    mut ledger: ResMut<RequestLedger>,
    mut metrics: ResMut<MetricsAggregator>,
    mut pending: ResMut<PendingManual>,
    mut calendar: ResMut<RenewalCalendar>,
) {
    if event.0.kind != EventKind::ProcessManual {
        return;
    }
    let Some(id) = event.0.request() else {
        warn!(at = event.0.timestamp, "manual review event without a request");
        return;
    };
    let now = event.0.timestamp;
    let Some(delay) = pending.take(now, id) else {
        warn!(request = %id, at = now, "manual review for a request that is not pending");
        return;
    };

    metrics.record_human_review(delay);
    if let Some(report) = admit_request(&mut engine, &mut ledger, &mut metrics, id, now) {
        schedule_grant_follow_ups(&report.decision, &mut clock, &mut calendar, horizon.0);
    }
}
