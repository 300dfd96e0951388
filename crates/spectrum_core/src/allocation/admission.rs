//! Admission: candidate search with priority preemption and mitigation.

use rand::seq::SliceRandom;
use tracing::debug;

use super::candidates::frequency_candidates;
use super::AllocationEngine;
use crate::assignment::{Assignment, AssignmentId, AssignmentPair};
use crate::band::FrequencyInterval;
use crate::conflict::{conflicts, mitigate, MitigationOutcome, Side};
use crate::request::{DenialReason, Request, RequestOutcome};
use crate::store::ConflictScope;

#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionDecision {
    Granted {
        assignment: AssignmentId,
        interval: FrequencyInterval,
        quality: f64,
        next_check: Option<u64>,
        expires_at: Option<u64>,
        /// Number of existing assignments it now coexists with.
        mitigations: usize,
    },
    Denied(DenialReason),
}

/// Everything an admission changed. Preemptions and terminations stick even
/// when the request is eventually denied.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionReport {
    pub decision: AdmissionDecision,
    pub preempted: Vec<AssignmentId>,
    pub terminated: Vec<AssignmentId>,
}

impl AdmissionReport {
    pub fn granted(&self) -> Option<AssignmentId> {
        match self.decision {
            AdmissionDecision::Granted { assignment, .. } => Some(assignment),
            AdmissionDecision::Denied(_) => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted().is_some()
    }
}

/// Quality reductions collected while scanning one candidate; applied only on grant.
#[derive(Debug, Default)]
struct Staged {
    trial_factor: f64,
    existing: Vec<(AssignmentId, f64)>,
}

impl Staged {
    fn new() -> Self {
        Self {
            trial_factor: 1.0,
            existing: Vec::new(),
        }
    }
}

impl AllocationEngine {
    /// Decides whether and where to grant `request` at time `now`.
    ///
    /// Records the outcome and a trace on the request. Denial is an ordinary
    /// outcome; nothing is retried.
    pub fn admit(&mut self, request: &mut Request, now: u64) -> AdmissionReport {
        request.add_trace(format!(
            "arrived at {}: node={}, bw={} MHz, class={}",
            request.arrival, request.node, request.bandwidth_mhz, request.class
        ));

        let range = self.allowed_range(request.class);
        let mut candidates = frequency_candidates(
            self.policy.allocation(),
            range,
            request.bandwidth_mhz,
            &self.band,
        );
        candidates.shuffle(&mut self.rng);
        let scope = self.draw_scope();
        let tier = self.policy.tier(request.class);

        let mut report = AdmissionReport {
            decision: AdmissionDecision::Denied(DenialReason::NoConflictFreeCandidate),
            preempted: Vec::new(),
            terminated: Vec::new(),
        };

        for interval in candidates {
            let trial = Assignment {
                id: AssignmentId(self.next_id),
                request: request.id,
                node: request.node,
                interval,
                class: request.class,
                quality: 1.0,
                tier,
                next_check: None,
                expires_at: None,
            };
            if let Some(staged) = self.scan_candidate(&trial, scope, request, &mut report) {
                let decision = self.grant(trial, staged, request, now);
                report.decision = decision;
                return report;
            }
        }

        let reason = DenialReason::NoConflictFreeCandidate;
        request.outcome = RequestOutcome::Denied { reason, at: now };
        request.add_trace(format!("denied at {now}: {reason}"));
        debug!(request = %request.id, node = %request.node, "request denied");
        report
    }

    /// Scans the visible assignments for conflicts with `trial`. Returns the staged
    /// mitigation if the candidate survives.
    fn scan_candidate(
        &mut self,
        trial: &Assignment,
        scope: ConflictScope,
        request: &mut Request,
        report: &mut AdmissionReport,
    ) -> Option<Staged> {
        let visible = self.store.ids_in_scope(scope, trial.node, &self.topology);
        let mut staged = Staged::new();

        for id in &visible {
            let Some(existing) = self.store.get(*id) else {
                continue;
            };
            if !conflicts(trial, existing, &self.topology) {
                continue;
            }
            let (existing_tier, existing_node) = (existing.tier, existing.node);

            if self.policy.is_hierarchical() && trial.tier < existing_tier {
                self.evict(*id);
                report.preempted.push(*id);
                request.add_trace(format!(
                    "preempted assignment {id} (node={existing_node}, tier={existing_tier})"
                ));
                debug!(request = %request.id, preempted = %id, "higher tier preempted incumbent");

                // Any remaining conflict fails the candidate, mitigated ones included.
                let blocker = visible.iter().copied().find(|other| {
                    self.store
                        .get(*other)
                        .is_some_and(|a| conflicts(trial, a, &self.topology))
                });
                return match blocker {
                    Some(other) => {
                        request.add_trace(format!(
                            "conflict remains after preemption with assignment {other}"
                        ));
                        None
                    }
                    None => Some(staged),
                };
            }

            if self.policy.is_hierarchical() && trial.tier > existing_tier {
                request.add_trace(format!(
                    "blocked by higher-priority assignment {id} at {}",
                    trial.interval
                ));
                return None;
            }

            let relationship = self.topology.relationship(trial.node, existing_node)?;
            match mitigate(
                self.policy.mitigation(),
                trial.tier,
                existing_tier,
                relationship,
                &mut self.rng,
            ) {
                MitigationOutcome::Coexist(factor) => {
                    staged.trial_factor *= factor;
                    staged.existing.push((*id, factor));
                }
                MitigationOutcome::Terminate(Side::Existing) => {
                    self.evict(*id);
                    report.terminated.push(*id);
                    request.add_trace(format!("terminated assignment {id} by mitigation"));
                }
                MitigationOutcome::Terminate(Side::Requesting) | MitigationOutcome::Fail => {
                    request.add_trace(format!(
                        "conflict with assignment {id} at {} not mitigated",
                        trial.interval
                    ));
                    return None;
                }
            }
        }
        Some(staged)
    }

    fn grant(
        &mut self,
        mut assignment: Assignment,
        staged: Staged,
        request: &mut Request,
        now: u64,
    ) -> AdmissionDecision {
        let id = assignment.id;
        self.next_id += 1;

        assignment.degrade(staged.trial_factor);
        assignment.next_check = self.renewal_interval().map(|interval| now + interval);
        assignment.expires_at = request.hold.map(|hold| now + hold);

        for (other, factor) in &staged.existing {
            if let Some(existing) = self.store.get_mut(*other) {
                existing.degrade(*factor);
            }
            self.mitigated.insert(AssignmentPair::new(id, *other));
        }

        let decision = AdmissionDecision::Granted {
            assignment: id,
            interval: assignment.interval,
            quality: assignment.quality,
            next_check: assignment.next_check,
            expires_at: assignment.expires_at,
            mitigations: staged.existing.len(),
        };
        request.outcome = RequestOutcome::Granted {
            assignment: id,
            interval: assignment.interval,
            at: now,
        };
        request.add_trace(format!("granted at {now}: {}", assignment.interval));
        debug!(
            request = %request.id,
            assignment = %id,
            node = %assignment.node,
            start_mhz = assignment.interval.start_mhz,
            end_mhz = assignment.interval.end_mhz,
            quality = assignment.quality,
            "request granted"
        );
        self.store.insert(assignment, &self.topology);
        decision
    }
}
