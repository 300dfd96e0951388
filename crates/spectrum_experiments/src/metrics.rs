//! Result rows: one flattened record per run, architecture labels first.

use serde::Serialize;
use spectrum_core::metrics::MetricsReport;
use spectrum_core::runner::SimulationOutcome;

use crate::parameters::ParameterSet;

/// Flattened metrics of a single run, ready for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub coordination: String,
    pub licensing: String,
    pub allocation: String,
    pub mitigation: String,
    pub sensing: String,
    pub pricing: String,
    pub enforcement: String,
    pub priority: String,
    pub demand: String,
    pub scheduler: String,
    pub horizon_minutes: u64,
    pub total_requests: usize,
    pub granted: usize,
    pub denied: usize,
    pub blocking_probability: f64,
    pub mean_quality: f64,
    pub interfering_assignments: usize,
    pub interference_rate: f64,
    pub total_active_users: usize,
    pub coord_queries: f64,
    pub human_minutes: f64,
    pub coordination_cost: f64,
    pub sue: f64,
    pub raw_sue: f64,
    pub preemptions: usize,
    pub terminations: usize,
    pub revocations: usize,
    pub mitigations: usize,
}

impl ExperimentResult {
    pub fn from_outcome(set: &ParameterSet, outcome: &SimulationOutcome) -> Self {
        Self::from_report(set, &outcome.report)
    }

    pub fn from_report(set: &ParameterSet, report: &MetricsReport) -> Self {
        let arch = &set.architecture;
        Self {
            experiment_id: set.experiment_id.clone(),
            run_id: set.run_id,
            seed: set.seed,
            coordination: arch.coordination.label().to_string(),
            licensing: arch.licensing.label().to_string(),
            allocation: arch.allocation.label().to_string(),
            mitigation: arch.mitigation.label().to_string(),
            sensing: arch.sensing.label().to_string(),
            pricing: arch.pricing.label().to_string(),
            enforcement: arch.enforcement.label().to_string(),
            priority: arch.priority.label().to_string(),
            demand: set.params.demand.label().to_string(),
            scheduler: set.params.scheduler.label().to_string(),
            horizon_minutes: set.params.horizon_minutes,
            total_requests: report.total_requests,
            granted: report.granted,
            denied: report.denied,
            blocking_probability: report.blocking_probability,
            mean_quality: report.mean_quality,
            interfering_assignments: report.interfering_assignments,
            interference_rate: report.interference_rate,
            total_active_users: report.total_active_users,
            coord_queries: report.coord_queries,
            human_minutes: report.human_minutes,
            coordination_cost: report.coordination_cost,
            sue: report.sue,
            raw_sue: report.raw_sue,
            preemptions: report.preemptions,
            terminations: report.terminations,
            revocations: report.revocations,
            mitigations: report.mitigations,
        }
    }

    /// `Coordination-Licensing-Allocation` identifier used in reports.
    pub fn short_id(&self) -> String {
        format!("{}-{}-{}", self.coordination, self.licensing, self.allocation)
    }
}
