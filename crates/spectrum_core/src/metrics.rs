//! Run metrics: time-weighted usage integration, cost bookkeeping and the
//! final [`MetricsReport`].

use std::collections::BTreeSet;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::allocation::{AdmissionDecision, AdmissionReport, AllocationEngine, RenewalReport};
use crate::assignment::AssignmentId;
use crate::conflict::conflicts;
use crate::policy::{ArchitecturePolicy, LicensingMode};
use crate::store::AssignmentStore;
use crate::topology::Topology;

/// Reference values of the normalized coordination cost.
pub const HUMAN_REFERENCE_MINUTES: f64 = 1.0;
pub const QUERY_REFERENCE_UNITS: f64 = 100.0;

/// Running sums observed during a run. Derived values are computed by [`MetricsAggregator::report`].
#[derive(Debug, Clone, Default, Resource)]
pub struct MetricsAggregator {
    weighted_usage: f64,
    raw_usage: f64,
    coord_queries: f64,
    human_minutes: f64,
    total_requests: usize,
    granted: usize,
    denied: usize,
    quality_sum: f64,
    quality_count: usize,
    preemptions: usize,
    terminations: usize,
    revocations: usize,
    mitigations: usize,
    integrated_minutes: u64,
}

impl MetricsAggregator {
    /// The initial coordination query is charged only for granted requests.
    pub fn record_admission(&mut self, report: &AdmissionReport, policy: &ArchitecturePolicy) {
        self.total_requests += 1;
        match &report.decision {
            AdmissionDecision::Granted {
                quality,
                mitigations,
                ..
            } => {
                self.granted += 1;
                self.coord_queries += policy.initial_query_cost();
                self.quality_sum += quality;
                self.quality_count += 1;
                self.mitigations += mitigations;
            }
            AdmissionDecision::Denied(_) => self.denied += 1,
        }
        self.preemptions += report.preempted.len();
        self.terminations += report.terminated.len();
    }

    /// Revocations count as denials. Periodic licensing pays per successful renewal;
    /// continuous polling is charged by [`Self::integrate`].
    pub fn record_renewal(&mut self, report: &RenewalReport, policy: &ArchitecturePolicy) {
        if policy.licensing() == LicensingMode::Periodic {
            self.coord_queries += policy.renewal_query_cost() * report.renewed.len() as f64;
        }
        self.revocations += report.revoked.len();
        self.denied += report.revoked.len();
        self.mitigations += report.mitigations;
    }

    pub fn record_human_review(&mut self, minutes: u64) {
        self.human_minutes += minutes as f64;
    }

    /// Accumulates usage for `dt` minutes with the store as it stood during the interval.
    pub fn integrate(
        &mut self,
        store: &AssignmentStore,
        topology: &Topology,
        policy: &ArchitecturePolicy,
        dt: u64,
    ) {
        if dt == 0 {
            return;
        }
        let dt_f = dt as f64;
        for assignment in store.iter() {
            let footprint = assignment.bandwidth_mhz() as f64 * topology.area(assignment.node) as f64 * dt_f;
            self.weighted_usage += footprint * assignment.quality;
            self.raw_usage += footprint;
        }
        if policy.licensing() == LicensingMode::Continuous {
            self.coord_queries += store.len() as f64 * policy.renewal_query_cost() * dt_f;
        }
        self.integrated_minutes += dt;
    }

    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    pub fn denied(&self) -> usize {
        self.denied
    }

    pub fn integrated_minutes(&self) -> u64 {
        self.integrated_minutes
    }

    /// Final record for a run over `horizon` minutes.
    pub fn report(&self, engine: &AllocationEngine, horizon: u64) -> MetricsReport {
        let policy = engine.policy();
        let store = engine.store();
        let topology = engine.topology();

        let capacity =
            engine.band().total_mhz as f64 * topology.num_cells() as f64 * horizon as f64;
        let capacity = capacity.max(1.0);

        let mean_quality = if store.is_empty() {
            if self.quality_count == 0 {
                0.0
            } else {
                self.quality_sum / self.quality_count as f64
            }
        } else {
            store.iter().map(|a| a.quality).sum::<f64>() / store.len() as f64
        };

        let interfering = interfering_assignments(engine);
        let multiplier = policy.cost_multiplier();
        let coord_queries = match policy.licensing() {
            LicensingMode::Periodic | LicensingMode::Continuous => self.coord_queries * multiplier,
            LicensingMode::Manual => self.coord_queries,
        };
        let human_minutes = match policy.licensing() {
            LicensingMode::Manual => self.human_minutes * multiplier,
            _ => self.human_minutes,
        };

        MetricsReport {
            total_requests: self.total_requests,
            granted: self.granted,
            denied: self.denied,
            blocking_probability: self.denied as f64 / self.total_requests.max(1) as f64,
            mean_quality,
            interfering_assignments: interfering.len(),
            interference_rate: interfering.len() as f64 / store.len().max(1) as f64,
            total_active_users: store.len(),
            coord_queries,
            human_minutes,
            coordination_cost: human_minutes / HUMAN_REFERENCE_MINUTES
                + coord_queries / QUERY_REFERENCE_UNITS,
            sue: self.weighted_usage / capacity,
            raw_sue: self.raw_usage / capacity,
            preemptions: self.preemptions,
            terminations: self.terminations,
            revocations: self.revocations,
            mitigations: self.mitigations,
        }
    }
}

/// Assignments in a conflicting pair of the active set that was never mitigated.
pub fn interfering_assignments(engine: &AllocationEngine) -> BTreeSet<AssignmentId> {
    let topology = engine.topology();
    let active: Vec<_> = engine.store().iter().collect();
    let mut interfering = BTreeSet::new();
    for (i, a) in active.iter().enumerate() {
        for b in &active[i + 1..] {
            if conflicts(a, b, topology) && !engine.is_mitigated(a.id, b.id) {
                interfering.insert(a.id);
                interfering.insert(b.id);
            }
        }
    }
    interfering
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub granted: usize,
    pub denied: usize,
    pub blocking_probability: f64,
    pub mean_quality: f64,
    pub interfering_assignments: usize,
    pub interference_rate: f64,
    pub total_active_users: usize,
    /// After architecture multipliers.
    pub coord_queries: f64,
    /// After architecture multipliers.
    pub human_minutes: f64,
    pub coordination_cost: f64,
    /// Quality-weighted spectrum utilization efficiency.
    pub sue: f64,
    pub raw_sue: f64,
    pub preemptions: usize,
    pub terminations: usize,
    pub revocations: usize,
    pub mitigations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::EngineSettings;
    use crate::band::{BandPlan, DeviceClass};
    use crate::policy::{AllocationPlan, ArchitectureChoice, MitigationStrategy, PriorityDiscipline};
    use crate::request::Request;

    fn engine(choice: ArchitectureChoice, band: BandPlan) -> AllocationEngine {
        AllocationEngine::new(
            Topology::grid(1, 1).expect("grid"),
            ArchitecturePolicy::new(choice).expect("feasible"),
            band,
            EngineSettings::default(),
            42,
        )
        .expect("engine")
    }

    #[test]
    fn blocking_probability_is_denied_over_total() {
        let choice = ArchitectureChoice::default()
            .with_licensing(LicensingMode::Manual)
            .with_allocation(AllocationPlan::LargeBlocks);
        let mut e = engine(choice, BandPlan::with_total(200));
        let mut metrics = MetricsAggregator::default();
        for i in 0..4 {
            let mut req = Request::new(i, 0, 0, 200, DeviceClass::FiveG);
            let report = e.admit(&mut req, 0);
            metrics.record_admission(&report, e.policy());
        }
        let report = metrics.report(&e, 10);
        assert_eq!(report.total_requests, 4);
        assert_eq!(report.granted, 1);
        assert_eq!(report.denied, 3);
        assert!((report.blocking_probability - 0.75).abs() < 1e-12);
    }

    #[test]
    fn denied_admissions_add_no_query_units() {
        let choice = ArchitectureChoice::default()
            .with_licensing(LicensingMode::Manual)
            .with_allocation(AllocationPlan::LargeBlocks);
        let mut e = engine(choice, BandPlan::with_total(200));
        let mut metrics = MetricsAggregator::default();
        for i in 0..4 {
            let mut req = Request::new(i, 0, 0, 200, DeviceClass::FiveG);
            let report = e.admit(&mut req, 0);
            metrics.record_admission(&report, e.policy());
        }
        // Only the single grant pays the centralized initial query.
        assert!((metrics.coord_queries - 1.0).abs() < 1e-12);
        let report = metrics.report(&e, 10);
        assert_eq!(report.denied, 3);
        assert!((report.coord_queries - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_run_reports_zeroes() {
        let e = engine(ArchitectureChoice::default(), BandPlan::default());
        let report = MetricsAggregator::default().report(&e, 100);
        assert_eq!(report.total_requests, 0);
        assert_eq!(report.blocking_probability, 0.0);
        assert_eq!(report.sue, 0.0);
        assert_eq!(report.interference_rate, 0.0);
    }

    #[test]
    fn sue_integrates_quality_weighted_footprint() {
        // Two opposite nodes at 0.7 each on a 60 MHz band, one cell: SUE = 2 * 0.7.
        let choice = ArchitectureChoice::default()
            .with_licensing(LicensingMode::Manual)
            .with_allocation(AllocationPlan::ArbitrarySlice)
            .with_mitigation(MitigationStrategy::PowerControl)
            .with_priority(PriorityDiscipline::CoPrimary);
        let mut e = engine(choice, BandPlan::with_total(60));
        let mut metrics = MetricsAggregator::default();
        for (i, node) in [0, 3].into_iter().enumerate() {
            let mut req = Request::new(i, 0, node, 60, DeviceClass::FiveG);
            let report = e.admit(&mut req, 0);
            metrics.record_admission(&report, e.policy());
        }
        metrics.integrate(e.store(), e.topology(), e.policy(), 10);
        let report = metrics.report(&e, 10);
        assert!((report.sue - 1.4).abs() < 1e-9);
        assert!((report.raw_sue - 2.0).abs() < 1e-9);
        assert!((report.mean_quality - 0.7).abs() < 1e-12);
        assert_eq!(report.mitigations, 1);
        assert_eq!(report.interfering_assignments, 0);
    }

    #[test]
    fn query_multiplier_applies_only_to_renewing_regimes() {
        // Sub-channels 1.5 * active 2 * co-primary 2 = 6.
        let periodic = engine(
            ArchitectureChoice::default().with_licensing(LicensingMode::Periodic),
            BandPlan::default(),
        );
        let mut metrics = MetricsAggregator::default();
        metrics.coord_queries = 10.0;
        metrics.human_minutes = 5.0;
        let report = metrics.report(&periodic, 1);
        assert!((report.coord_queries - 60.0).abs() < 1e-9);
        assert!((report.human_minutes - 5.0).abs() < 1e-9);

        let manual = engine(
            ArchitectureChoice::default().with_licensing(LicensingMode::Manual),
            BandPlan::default(),
        );
        let report = metrics.report(&manual, 1);
        assert!((report.coord_queries - 10.0).abs() < 1e-9);
        assert!((report.human_minutes - 30.0).abs() < 1e-9);
        assert!((report.coordination_cost - (30.0 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn continuous_polling_charges_per_active_minute() {
        let choice = ArchitectureChoice::default()
            .with_licensing(LicensingMode::Continuous)
            .with_allocation(AllocationPlan::LargeBlocks);
        let mut e = engine(choice, BandPlan::default());
        let mut metrics = MetricsAggregator::default();
        let mut req = Request::new(0, 0, 0, 100, DeviceClass::FiveG);
        let report = e.admit(&mut req, 0);
        metrics.record_admission(&report, e.policy());
        metrics.integrate(e.store(), e.topology(), e.policy(), 20);
        // 1.0 initial query plus 20 minutes at 0.5.
        assert!((metrics.coord_queries - 11.0).abs() < 1e-9);
        assert_eq!(metrics.integrated_minutes(), 20);
    }

    #[test]
    fn revocations_count_as_denials() {
        let policy = ArchitecturePolicy::new(
            ArchitectureChoice::default().with_licensing(LicensingMode::Periodic),
        )
        .expect("feasible");
        let mut metrics = MetricsAggregator::default();
        metrics.record_renewal(
            &RenewalReport {
                renewed: vec![AssignmentId(1), AssignmentId(2)],
                revoked: vec![AssignmentId(3)],
                mitigations: 0,
            },
            &policy,
        );
        assert_eq!(metrics.denied(), 1);
        assert!((metrics.coord_queries - 1.0).abs() < 1e-12);
    }
}
