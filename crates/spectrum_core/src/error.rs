//! Configuration errors raised before a run starts.
//!
//! Admission denials and renewal revocations are ordinary outcomes and never
//! surface here.

use thiserror::Error;

use crate::policy::FeasibilityRule;
use crate::topology::NodeId;

/// Result type for setup and configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Policy combination rejected by the feasibility filter.
    #[error("infeasible architecture {architecture}: {rule}")]
    Infeasible {
        architecture: String,
        rule: FeasibilityRule,
    },

    #[error("invalid band: {0}")]
    InvalidBand(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("request {request} targets unknown node {node}")]
    UnknownNode { request: usize, node: NodeId },

    #[error("request {request} has zero bandwidth")]
    ZeroBandwidth { request: usize },

    #[error("requests must be sorted by arrival time (request {request} arrives at {arrival} after {previous})")]
    UnsortedArrivals {
        request: usize,
        arrival: u64,
        previous: u64,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}
