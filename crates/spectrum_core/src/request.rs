//! Spectrum access requests and their recorded outcomes.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentId;
use crate::band::{DeviceClass, FrequencyInterval};
use crate::topology::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub usize);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    NoConflictFreeCandidate,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NoConflictFreeCandidate => f.write_str("no conflict-free candidate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RequestOutcome {
    /// Not yet submitted to the engine (or still waiting for manual review).
    #[default]
    Pending,
    Granted {
        assignment: AssignmentId,
        interval: FrequencyInterval,
        at: u64,
    },
    Denied {
        reason: DenialReason,
        at: u64,
    },
}

/// One unit of demand. The engine only writes `outcome` and `trace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    /// Arrival time in minutes.
    pub arrival: u64,
    pub node: NodeId,
    pub bandwidth_mhz: u32,
    pub class: DeviceClass,
    /// Lease length; `None` keeps the grant until it is revoked.
    #[serde(default)]
    pub hold: Option<u64>,
    #[serde(default)]
    pub outcome: RequestOutcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl Request {
    pub fn new(id: usize, arrival: u64, node: usize, bandwidth_mhz: u32, class: DeviceClass) -> Self {
        Self {
            id: RequestId(id),
            arrival,
            node: NodeId(node),
            bandwidth_mhz,
            class,
            hold: None,
            outcome: RequestOutcome::Pending,
            trace: Vec::new(),
        }
    }

    pub fn with_hold(mut self, minutes: u64) -> Self {
        self.hold = Some(minutes);
        self
    }

    pub fn is_granted(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Granted { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Denied { .. })
    }

    pub fn granted_interval(&self) -> Option<FrequencyInterval> {
        match self.outcome {
            RequestOutcome::Granted { interval, .. } => Some(interval),
            _ => None,
        }
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self.outcome {
            RequestOutcome::Denied { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn add_trace(&mut self, line: String) {
        self.trace.push(line);
    }
}

/// All requests of a run, indexed by [`RequestId`].
#[derive(Debug, Clone, Default, Resource)]
pub struct RequestLedger {
    requests: Vec<Request>,
}

impl RequestLedger {
    /// Requests must already carry ids `0..n` in order.
    pub fn new(requests: Vec<Request>) -> Self {
        debug_assert!(
            requests.iter().enumerate().all(|(i, r)| r.id.0 == i),
            "request ids must match their position"
        );
        Self { requests }
    }

    pub fn get(&self, id: RequestId) -> Option<&Request> {
        self.requests.get(id.0)
    }

    pub fn get_mut(&mut self, id: RequestId) -> Option<&mut Request> {
        self.requests.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }
}
