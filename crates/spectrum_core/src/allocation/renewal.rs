//! Renewal: re-validation of due assignments under periodic or continuous licensing.
//!
//! Re-validation never preempts. Conflicts are resolved by mitigation only, and
//! a pair already recorded as mitigated is treated as resolved so quality is
//! not degraded twice for the same pair.

use tracing::debug;

use super::AllocationEngine;
use crate::assignment::{AssignmentId, AssignmentPair};
use crate::conflict::{conflicts, mitigate, MitigationOutcome, Side};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenewalReport {
    /// Assignments whose next check moved forward by one interval.
    pub renewed: Vec<AssignmentId>,
    /// Assignments removed by re-validation (each counts as a denial).
    pub revoked: Vec<AssignmentId>,
    /// New mitigated pairs recorded during the pass.
    pub mitigations: usize,
}

enum Verdict {
    Keep,
    Revoke,
}

impl AllocationEngine {
    /// Re-validates every assignment whose next check equals `now`.
    ///
    /// Manual licensing has no renewal; the report is empty.
    pub fn renew(&mut self, now: u64) -> RenewalReport {
        let mut report = RenewalReport::default();
        let Some(interval) = self.renewal_interval() else {
            return report;
        };

        let due: Vec<AssignmentId> = self
            .store
            .iter()
            .filter(|a| a.next_check == Some(now))
            .map(|a| a.id)
            .collect();

        for id in due {
            // May already be gone, revoked as the other side earlier in this pass.
            if !self.store.contains(id) {
                continue;
            }
            match self.revalidate(id, &mut report) {
                Verdict::Keep => {
                    if let Some(assignment) = self.store.get_mut(id) {
                        assignment.next_check = Some(now + interval);
                    }
                    report.renewed.push(id);
                }
                Verdict::Revoke => {
                    self.evict(id);
                    report.revoked.push(id);
                    debug!(assignment = %id, at = now, "assignment revoked at renewal");
                }
            }
        }
        report
    }

    fn revalidate(&mut self, id: AssignmentId, report: &mut RenewalReport) -> Verdict {
        let Some(subject) = self.store.get(id).cloned() else {
            return Verdict::Revoke;
        };
        let scope = self.draw_scope();
        let visible = self.store.ids_in_scope(scope, subject.node, &self.topology);

        for other_id in visible {
            if other_id == id || self.mitigated.contains(&AssignmentPair::new(id, other_id)) {
                continue;
            }
            let Some(other) = self.store.get(other_id) else {
                continue;
            };
            if !conflicts(&subject, other, &self.topology) {
                continue;
            }
            let (other_tier, other_node) = (other.tier, other.node);
            let Some(relationship) = self.topology.relationship(subject.node, other_node) else {
                continue;
            };

            match mitigate(
                self.policy.mitigation(),
                subject.tier,
                other_tier,
                relationship,
                &mut self.rng,
            ) {
                MitigationOutcome::Coexist(factor) => {
                    for side in [id, other_id] {
                        if let Some(a) = self.store.get_mut(side) {
                            a.degrade(factor);
                        }
                    }
                    self.mitigated.insert(AssignmentPair::new(id, other_id));
                    report.mitigations += 1;
                }
                MitigationOutcome::Terminate(Side::Existing) => {
                    self.evict(other_id);
                    report.revoked.push(other_id);
                    debug!(assignment = %other_id, by = %id, "lower tier revoked at renewal");
                }
                MitigationOutcome::Terminate(Side::Requesting) | MitigationOutcome::Fail => {
                    return Verdict::Revoke;
                }
            }
        }
        Verdict::Keep
    }
}
