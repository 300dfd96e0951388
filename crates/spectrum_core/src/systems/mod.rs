//! ECS systems for both schedulers.
//!
//! Event systems react to [`crate::clock::CurrentEvent`]; tick systems run once per
//! minute in a fixed chain. Both go through the helpers below so that request
//! delivery is identical.

pub mod arrival;
pub mod expiry;
pub mod manual;
pub mod renewal;
pub mod tick;

use crate::allocation::{AdmissionReport, AllocationEngine};
use crate::lifecycle::PendingManual;
use crate::metrics::MetricsAggregator;
use crate::policy::LicensingMode;
use crate::request::{RequestId, RequestLedger};

/// What happened to a request handed to the system at arrival.
#[derive(Debug)]
pub(crate) enum Delivery {
    /// Parked for human review until `process_at`.
    Deferred { process_at: u64 },
    Admitted(AdmissionReport),
}

/// Routes an arriving request: manual licensing parks it, every other regime admits now.
pub(crate) fn deliver(
    engine: &mut AllocationEngine,
    ledger: &mut RequestLedger,
    metrics: &mut MetricsAggregator,
    pending: &mut PendingManual,
    id: RequestId,
    now: u64,
) -> Option<Delivery> {
    let arrival = ledger.get(id)?.arrival;
    if engine.policy().licensing() == LicensingMode::Manual {
        let delay = engine.manual_delay();
        let process_at = arrival + delay;
        pending.push(process_at, id, delay);
        return Some(Delivery::Deferred { process_at });
    }
    admit_request(engine, ledger, metrics, id, now).map(Delivery::Admitted)
}

pub(crate) fn admit_request(
    engine: &mut AllocationEngine,
    ledger: &mut RequestLedger,
    metrics: &mut MetricsAggregator,
    id: RequestId,
    now: u64,
) -> Option<AdmissionReport> {
    let request = ledger.get_mut(id)?;
    let report = engine.admit(request, now);
    metrics.record_admission(&report, engine.policy());
    Some(report)
}
