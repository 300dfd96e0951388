//! Synthetic demand: deterministic arrival patterns with a weighted device and
//! bandwidth mix.
//!
//! Arrivals are evenly spaced over the horizon, nodes are assigned round-robin
//! and device class and bandwidth are drawn from the profile with a generator
//! seeded independently of the allocation engine.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::band::DeviceClass;
use crate::error::{ConfigError, ConfigResult};
use crate::policy::MINUTES_PER_DAY;
use crate::request::Request;
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandScenario {
    /// Two arrivals per week.
    Low,
    /// One arrival per day.
    #[default]
    Medium,
    /// Two arrivals per day.
    High,
}

impl DemandScenario {
    pub const ALL: [DemandScenario; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Minutes between consecutive arrivals.
    pub fn arrival_interval(self) -> u64 {
        match self {
            Self::Low => 7 * MINUTES_PER_DAY / 2,
            Self::Medium => MINUTES_PER_DAY,
            Self::High => MINUTES_PER_DAY / 2,
        }
    }
}

impl std::fmt::Display for DemandScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Weighted device mix and per-class bandwidth choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub device_mix: Vec<(DeviceClass, f64)>,
    pub five_g_bandwidth: Vec<(u32, f64)>,
    pub iot_bandwidth: Vec<(u32, f64)>,
    pub federal_bandwidth: Vec<(u32, f64)>,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self {
            device_mix: vec![
                (DeviceClass::FiveG, 0.5),
                (DeviceClass::Iot, 0.35),
                (DeviceClass::Federal, 0.15),
            ],
            five_g_bandwidth: vec![(100, 0.6), (200, 0.4)],
            iot_bandwidth: vec![(20, 0.7), (40, 0.3)],
            federal_bandwidth: vec![(40, 0.5), (100, 0.5)],
        }
    }
}

impl DemandProfile {
    fn bandwidths(&self, class: DeviceClass) -> &[(u32, f64)] {
        match class {
            DeviceClass::FiveG => &self.five_g_bandwidth,
            DeviceClass::Iot => &self.iot_bandwidth,
            DeviceClass::Federal => &self.federal_bandwidth,
        }
    }
}

/// Weighted sampler built once per generation run.
struct Sampler<'a> {
    profile: &'a DemandProfile,
    devices: WeightedIndex<f64>,
    bandwidths: Vec<(DeviceClass, WeightedIndex<f64>)>,
}

impl<'a> Sampler<'a> {
    fn new(profile: &'a DemandProfile) -> ConfigResult<Self> {
        let devices = weighted(profile.device_mix.iter().map(|(_, w)| *w), "device mix")?;
        let mut bandwidths = Vec::new();
        for (class, _) in &profile.device_mix {
            let table = profile.bandwidths(*class);
            if table.iter().any(|(bw, _)| *bw == 0) {
                return Err(ConfigError::InvalidParameter(format!(
                    "zero bandwidth in {class} table"
                )));
            }
            bandwidths.push((*class, weighted(table.iter().map(|(_, w)| *w), class.label())?));
        }
        Ok(Self {
            profile,
            devices,
            bandwidths,
        })
    }

    fn draw(&self, rng: &mut StdRng) -> (DeviceClass, u32) {
        let slot = self.devices.sample(rng);
        let class = self.profile.device_mix[slot].0;
        let (_, dist) = &self.bandwidths[slot];
        let bandwidth = self.profile.bandwidths(class)[dist.sample(rng)].0;
        (class, bandwidth)
    }
}

fn weighted(weights: impl Iterator<Item = f64>, what: &str) -> ConfigResult<WeightedIndex<f64>> {
    WeightedIndex::new(weights)
        .map_err(|err| ConfigError::InvalidParameter(format!("invalid {what} weights: {err}")))
}

/// Generates the ordered request stream of `scenario` over `[0, horizon)`.
pub fn generate_demand(
    scenario: DemandScenario,
    profile: &DemandProfile,
    topology: &Topology,
    horizon: u64,
    seed: u64,
) -> ConfigResult<Vec<Request>> {
    if topology.is_empty() {
        return Err(ConfigError::InvalidTopology("no nodes to place demand on".into()));
    }
    let sampler = Sampler::new(profile)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let interval = scenario.arrival_interval();

    let requests = (0..horizon)
        .step_by(interval as usize)
        .enumerate()
        .map(|(index, arrival)| {
            let (class, bandwidth) = sampler.draw(&mut rng);
            Request::new(index, arrival, index % topology.len(), bandwidth, class)
        })
        .collect();
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topo() -> Topology {
        Topology::grid(3, 3).expect("grid")
    }

    #[test]
    fn arrivals_follow_scenario_spacing() {
        let horizon = 180 * MINUTES_PER_DAY;
        let profile = DemandProfile::default();
        let low = generate_demand(DemandScenario::Low, &profile, &topo(), horizon, 42).expect("low");
        let medium =
            generate_demand(DemandScenario::Medium, &profile, &topo(), horizon, 42).expect("medium");
        let high = generate_demand(DemandScenario::High, &profile, &topo(), horizon, 42).expect("high");
        assert_eq!(low.len(), 52);
        assert_eq!(medium.len(), 180);
        assert_eq!(high.len(), 360);
        assert_eq!(low[1].arrival, 5040);
        assert!(high.windows(2).all(|w| w[1].arrival - w[0].arrival == 720));
    }

    #[test]
    fn nodes_are_assigned_round_robin() {
        let topology = topo();
        let requests = generate_demand(
            DemandScenario::Medium,
            &DemandProfile::default(),
            &topology,
            40 * MINUTES_PER_DAY,
            1,
        )
        .expect("demand");
        for (i, req) in requests.iter().enumerate() {
            assert_eq!(req.node.0, i % topology.len());
            assert_eq!(req.id.0, i);
        }
    }

    #[test]
    fn bandwidths_match_device_tables() {
        let profile = DemandProfile::default();
        let requests =
            generate_demand(DemandScenario::High, &profile, &topo(), 180 * MINUTES_PER_DAY, 9)
                .expect("demand");
        for req in &requests {
            let allowed: Vec<u32> = profile.bandwidths(req.class).iter().map(|(bw, _)| *bw).collect();
            assert!(allowed.contains(&req.bandwidth_mhz), "{req:?}");
        }
        assert!(DeviceClass::ALL
            .iter()
            .all(|class| requests.iter().any(|r| r.class == *class)));
    }

    #[test]
    fn same_seed_same_stream() {
        let profile = DemandProfile::default();
        let a = generate_demand(DemandScenario::Medium, &profile, &topo(), 20_000, 5).expect("a");
        let b = generate_demand(DemandScenario::Medium, &profile, &topo(), 20_000, 5).expect("b");
        let key = |r: &Request| (r.arrival, r.node, r.bandwidth_mhz, r.class);
        assert_eq!(
            a.iter().map(key).collect::<Vec<_>>(),
            b.iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let profile = DemandProfile {
            device_mix: vec![(DeviceClass::Iot, 0.0)],
            ..DemandProfile::default()
        };
        let err = generate_demand(DemandScenario::Low, &profile, &topo(), 10_000, 1);
        assert!(matches!(err, Err(ConfigError::InvalidParameter(_))));
    }

    #[test]
    fn scenario_labels_parse() {
        assert_eq!(DemandScenario::from_label(" HIGH "), Some(DemandScenario::High));
        assert_eq!(DemandScenario::from_label("extreme"), None);
    }
}
