//! Fixed-tick housekeeping chain: arrivals, expiry, renewal, manual batch, usage.
//!
//! One run of the chain covers the minute `[now, now + 1)`.

use bevy_ecs::prelude::{Res, ResMut};
use tracing::warn;

use crate::allocation::AllocationEngine;
use crate::lifecycle::{ArrivalCursor, PendingManual, TickClock};
use crate::metrics::MetricsAggregator;
use crate::request::{RequestId, RequestLedger};
use crate::scenario::ManualBatchInterval;
use crate::systems::{admit_request, deliver};

pub fn tick_arrival_system(
    tick: Res<TickClock>,
    mut cursor: ResMut<ArrivalCursor>,
    mut engine: ResMut<AllocationEngine>,
    mut ledger: ResMut<RequestLedger>,
    mut metrics: ResMut<MetricsAggregator>,
    mut pending: ResMut<PendingManual>,
) {
    while let Some(arrival) = ledger.get(RequestId(cursor.0)).map(|r| r.arrival) {
        if arrival > tick.now {
            break;
        }
        let id = RequestId(cursor.0);
        if deliver(&mut engine, &mut ledger, &mut metrics, &mut pending, id, tick.now).is_none() {
            warn!(request = %id, "arrival for unknown request");
        }
        cursor.0 += 1;
    }
}

pub fn tick_expiry_system(tick: Res<TickClock>, mut engine: ResMut<AllocationEngine>) {
    engine.expire_due(tick.now);
}

pub fn tick_renewal_system(
    tick: Res<TickClock>,
    mut engine: ResMut<AllocationEngine>,
    mut metrics: ResMut<MetricsAggregator>,
) {
    if engine.renewal_interval().is_none() {
        return;
    }
    let report = engine.renew(tick.now);
    metrics.record_renewal(&report, engine.policy());
}

/// Submits every manual request whose review finished by now, on batch boundaries only.
pub fn tick_manual_batch_system(
    tick: Res<TickClock>,
    batch: Res<ManualBatchInterval>,
    mut engine: ResMut<AllocationEngine>,
    mut ledger: ResMut<RequestLedger>,
    mut metrics: ResMut<MetricsAggregator>,
    mut pending: ResMut<PendingManual>,
) {
    if pending.is_empty() || tick.now % batch.0 != 0 {
        return;
    }
    for (id, delay) in pending.drain_due(tick.now) {
        metrics.record_human_review(delay);
        admit_request(&mut engine, &mut ledger, &mut metrics, id, tick.now);
    }
}

pub fn tick_usage_system(engine: Res<AllocationEngine>, mut metrics: ResMut<MetricsAggregator>) {
    metrics.integrate(engine.store(), engine.topology(), engine.policy(), 1);
}
