//! Conflict predicates and the interference-mitigation decision table.
//!
//! Two assignments conflict when their frequency intervals overlap and their
//! nodes share at least one cell. Mitigation may let a conflicting pair coexist
//! at reduced quality, terminate the lower-priority side, or fail.

use rand::Rng;

use crate::assignment::Assignment;
use crate::band::FrequencyInterval;
use crate::policy::MitigationStrategy;
use crate::topology::{NodeId, NodeRelationship, Topology};

pub const POWER_CONTROL_QUALITY: f64 = 0.7;
pub const BEAMFORMING_QUALITY: f64 = 0.8;
pub const COMBINATION_NEAR_QUALITY: f64 = 0.65;

/// Side of a conflicting pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The assignment being admitted or renewed.
    Requesting,
    /// The assignment it collided with.
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MitigationOutcome {
    /// Both sides stay, each quality multiplied by the factor.
    Coexist(f64),
    Terminate(Side),
    Fail,
}

pub fn spectral_overlap(a: &FrequencyInterval, b: &FrequencyInterval) -> bool {
    a.overlaps(b)
}

pub fn spatial_overlap(a: NodeId, b: NodeId, topology: &Topology) -> bool {
    topology.shares_cell(a, b)
}

pub fn conflicts(a: &Assignment, b: &Assignment, topology: &Topology) -> bool {
    spectral_overlap(&a.interval, &b.interval) && spatial_overlap(a.node, b.node, topology)
}

/// Decides how a conflict between two assignments is resolved.
///
/// `rng` is consulted only for the combination coin on opposite nodes with equal tiers.
pub fn mitigate<R: Rng + ?Sized>(
    strategy: MitigationStrategy,
    requesting_tier: u8,
    existing_tier: u8,
    relationship: NodeRelationship,
    rng: &mut R,
) -> MitigationOutcome {
    let equal_tiers = requesting_tier == existing_tier;
    let lower_priority = if requesting_tier > existing_tier {
        Side::Requesting
    } else {
        Side::Existing
    };

    match (strategy, relationship) {
        (MitigationStrategy::None, _) | (MitigationStrategy::FrequencyHopping, _) => {
            MitigationOutcome::Fail
        }
        (MitigationStrategy::PowerControl, NodeRelationship::Opposite) => {
            if equal_tiers {
                MitigationOutcome::Coexist(POWER_CONTROL_QUALITY)
            } else {
                MitigationOutcome::Terminate(lower_priority)
            }
        }
        (MitigationStrategy::Beamforming, NodeRelationship::Opposite) => {
            if equal_tiers {
                MitigationOutcome::Coexist(BEAMFORMING_QUALITY)
            } else {
                MitigationOutcome::Terminate(lower_priority)
            }
        }
        (MitigationStrategy::PowerControl | MitigationStrategy::Beamforming, _) => {
            MitigationOutcome::Fail
        }
        (MitigationStrategy::Combination, _) if !equal_tiers => MitigationOutcome::Fail,
        (MitigationStrategy::Combination, NodeRelationship::Opposite) => {
            if rng.gen_bool(0.5) {
                MitigationOutcome::Coexist(POWER_CONTROL_QUALITY)
            } else {
                MitigationOutcome::Coexist(BEAMFORMING_QUALITY)
            }
        }
        (MitigationStrategy::Combination, NodeRelationship::Adjacent | NodeRelationship::Same) => {
            MitigationOutcome::Coexist(COMBINATION_NEAR_QUALITY)
        }
    }
}
