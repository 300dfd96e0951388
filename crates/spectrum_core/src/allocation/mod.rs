//! Resource allocation engine.
//!
//! The engine owns the active assignment store and the run's single random
//! generator. Schedulers drive it through [`AllocationEngine::admit`],
//! [`AllocationEngine::renew`] and the expiry operations; time advance lives
//! entirely outside it.

mod admission;
pub mod candidates;
mod renewal;

use std::collections::BTreeSet;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assignment::{Assignment, AssignmentId, AssignmentPair};
use crate::band::{BandPlan, DeviceClass, FrequencyInterval};
use crate::error::{ConfigError, ConfigResult};
use crate::policy::{
    ArchitecturePolicy, CoordinationMode, LicensingMode, CONTINUOUS_RENEWAL_INTERVAL,
    PERIODIC_RENEWAL_INTERVAL,
};
use crate::store::{AssignmentStore, ConflictScope};
use crate::topology::Topology;

pub use admission::{AdmissionDecision, AdmissionReport};
pub use renewal::RenewalReport;

/// How long manual-licensing requests wait for human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ManualDelayModel {
    /// Fixed delay by coordination topology (30/20/10 days).
    ByCoordination,
    /// Uniform delay in `[min, max]` minutes drawn from the run generator.
    Uniform { min: u64, max: u64 },
}

impl Default for ManualDelayModel {
    fn default() -> Self {
        Self::ByCoordination
    }
}

/// Tunables of the engine that are not part of the architecture itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Chance that a hybrid request is checked with global scope.
    pub hybrid_global_probability: f64,
    pub periodic_interval: u64,
    pub continuous_interval: u64,
    pub manual_delay: ManualDelayModel,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            hybrid_global_probability: 0.5,
            periodic_interval: PERIODIC_RENEWAL_INTERVAL,
            continuous_interval: CONTINUOUS_RENEWAL_INTERVAL,
            manual_delay: ManualDelayModel::ByCoordination,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.hybrid_global_probability) {
            return Err(ConfigError::InvalidParameter(format!(
                "hybrid_global_probability must be in [0, 1], got {}",
                self.hybrid_global_probability
            )));
        }
        if self.periodic_interval == 0 || self.continuous_interval == 0 {
            return Err(ConfigError::InvalidParameter(
                "renewal intervals must be > 0".into(),
            ));
        }
        if let ManualDelayModel::Uniform { min, max } = self.manual_delay {
            if min > max {
                return Err(ConfigError::InvalidParameter(format!(
                    "manual delay bounds reversed: {min} > {max}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Resource)]
pub struct AllocationEngine {
    topology: Topology,
    policy: ArchitecturePolicy,
    band: BandPlan,
    settings: EngineSettings,
    store: AssignmentStore,
    mitigated: BTreeSet<AssignmentPair>,
    rng: StdRng,
    next_id: u64,
}

impl AllocationEngine {
    pub fn new(
        topology: Topology,
        policy: ArchitecturePolicy,
        band: BandPlan,
        settings: EngineSettings,
        seed: u64,
    ) -> ConfigResult<Self> {
        band.validate()?;
        settings.validate()?;
        Ok(Self {
            topology,
            policy,
            band,
            settings,
            store: AssignmentStore::new(),
            mitigated: BTreeSet::new(),
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn policy(&self) -> &ArchitecturePolicy {
        &self.policy
    }

    pub fn band(&self) -> &BandPlan {
        &self.band
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.store.iter()
    }

    /// Pairs whose conflict was resolved by mitigation.
    pub fn mitigated_pairs(&self) -> &BTreeSet<AssignmentPair> {
        &self.mitigated
    }

    pub fn is_mitigated(&self, a: AssignmentId, b: AssignmentId) -> bool {
        self.mitigated.contains(&AssignmentPair::new(a, b))
    }

    /// Re-validation interval of the licensing regime; `None` for manual grants.
    pub fn renewal_interval(&self) -> Option<u64> {
        match self.policy.licensing() {
            LicensingMode::Manual => None,
            LicensingMode::Periodic => Some(self.settings.periodic_interval),
            LicensingMode::Continuous => Some(self.settings.continuous_interval),
        }
    }

    /// Human-review delay for the next manual request.
    pub fn manual_delay(&mut self) -> u64 {
        match self.settings.manual_delay {
            ManualDelayModel::ByCoordination => self.policy.manual_delay(),
            ManualDelayModel::Uniform { min, max } => self.rng.gen_range(min..=max),
        }
    }

    /// Removes an assignment on external request. Idempotent; not counted as a denial.
    pub fn expire(&mut self, id: AssignmentId) -> Option<Assignment> {
        let removed = self.evict(id)?;
        debug!(assignment = %id, node = %removed.node, "assignment expired");
        Some(removed)
    }

    /// Expires every assignment whose lease ended at or before `now`.
    pub fn expire_due(&mut self, now: u64) -> Vec<AssignmentId> {
        let due: Vec<AssignmentId> = self
            .store
            .iter()
            .filter(|a| a.expires_at.is_some_and(|t| t <= now))
            .map(|a| a.id)
            .collect();
        for id in &due {
            self.expire(*id);
        }
        due
    }

    fn draw_scope(&mut self) -> ConflictScope {
        match self.policy.coordination() {
            CoordinationMode::Centralized => ConflictScope::Global,
            CoordinationMode::Decentralized => ConflictScope::Neighborhood,
            CoordinationMode::Hybrid => {
                if self.rng.gen_bool(self.settings.hybrid_global_probability) {
                    ConflictScope::Global
                } else {
                    ConflictScope::Neighborhood
                }
            }
        }
    }

    /// Frequency range a device class may be granted from.
    fn allowed_range(&self, class: DeviceClass) -> FrequencyInterval {
        if self.policy.is_exclusive() {
            self.band.exclusive_partition(class)
        } else {
            self.band.full()
        }
    }

    /// Removes from the store and forgets its mitigation pairs.
    fn evict(&mut self, id: AssignmentId) -> Option<Assignment> {
        let removed = self.store.remove(id, &self.topology)?;
        self.mitigated.retain(|pair| !pair.contains(id));
        Some(removed)
    }
}
