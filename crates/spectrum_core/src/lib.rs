pub mod allocation;
pub mod assignment;
pub mod band;
pub mod clock;
pub mod conflict;
pub mod demand;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod policy;
pub mod request;
pub mod runner;
pub mod scenario;
pub mod store;
pub mod systems;
pub mod topology;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
