use std::fmt;

use serde::{Deserialize, Serialize};

use crate::band::{DeviceClass, FrequencyInterval};
use crate::request::RequestId;
use crate::topology::NodeId;

/// Monotonic id; never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentId(pub u64);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A granted frequency interval held by one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub request: RequestId,
    pub node: NodeId,
    pub interval: FrequencyInterval,
    pub class: DeviceClass,
    /// In `(0, 1]`; only ever reduced multiplicatively by mitigation.
    pub quality: f64,
    /// 0 is the highest priority.
    pub tier: u8,
    /// Next re-validation time; `None` for permanent (manual) grants.
    pub next_check: Option<u64>,
    pub expires_at: Option<u64>,
}

impl Assignment {
    pub fn bandwidth_mhz(&self) -> u32 {
        self.interval.width_mhz()
    }

    pub(crate) fn degrade(&mut self, factor: f64) {
        debug_assert!(factor > 0.0 && factor <= 1.0, "quality factor out of range");
        self.quality *= factor;
    }
}

/// Unordered pair of assignments whose conflict was resolved by mitigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentPair(AssignmentId, AssignmentId);

impl AssignmentPair {
    pub fn new(a: AssignmentId, b: AssignmentId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, id: AssignmentId) -> bool {
        self.0 == id || self.1 == id
    }

    pub fn ids(&self) -> (AssignmentId, AssignmentId) {
        (self.0, self.1)
    }
}
