use bevy_ecs::prelude::World;

use crate::allocation::AllocationEngine;
use crate::band::{BandPlan, DeviceClass};
use crate::clock::SimulationClock;
use crate::demand::generate_demand;
use crate::error::{ConfigError, ConfigResult};
use crate::lifecycle::{ArrivalCursor, PendingManual, RenewalCalendar, TickClock};
use crate::metrics::MetricsAggregator;
use crate::policy::{
    AllocationPlan, ArchitectureChoice, ArchitecturePolicy, CoordinationMode, EnforcementMode,
    LicensingMode, MitigationStrategy, PricingMode, PriorityDiscipline, SensingMode,
    MINUTES_PER_DAY,
};
use crate::request::{Request, RequestLedger};
use crate::scenario::params::{ManualBatchInterval, SimulationHorizon, SimulationParams};
use crate::topology::{Node, NodeId, Topology};

/// Validated inputs of one run: parameters, topology, policy and request stream.
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    params: SimulationParams,
    topology: Topology,
    policy: ArchitecturePolicy,
    requests: Vec<Request>,
}

impl SimulationSetup {
    /// Grid topology from `params`, explicit request stream.
    pub fn new(
        params: SimulationParams,
        policy: ArchitecturePolicy,
        requests: Vec<Request>,
    ) -> ConfigResult<Self> {
        params.validate()?;
        let topology = Topology::grid(params.grid_rows, params.grid_cols)?;
        Self::with_topology(params, topology, policy, requests)
    }

    /// Grid topology and requests drawn by the demand generator.
    pub fn generated(params: SimulationParams, policy: ArchitecturePolicy) -> ConfigResult<Self> {
        params.validate()?;
        let topology = Topology::grid(params.grid_rows, params.grid_cols)?;
        let requests = generate_demand(
            params.demand,
            &params.demand_profile,
            &topology,
            params.horizon_minutes,
            params.seed,
        )?;
        Self::with_topology(params, topology, policy, requests)
    }

    /// Hand-built topology; grid dimensions in `params` are ignored.
    pub fn with_topology(
        params: SimulationParams,
        topology: Topology,
        policy: ArchitecturePolicy,
        requests: Vec<Request>,
    ) -> ConfigResult<Self> {
        params.validate()?;
        validate_requests(&topology, &requests)?;
        Ok(Self {
            params,
            topology,
            policy,
            requests,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn policy(&self) -> &ArchitecturePolicy {
        &self.policy
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

fn validate_requests(topology: &Topology, requests: &[Request]) -> ConfigResult<()> {
    let mut previous = 0;
    for (index, request) in requests.iter().enumerate() {
        if request.id.0 != index {
            return Err(ConfigError::InvalidParameter(format!(
                "request at position {index} has id {}",
                request.id
            )));
        }
        if !topology.contains(request.node) {
            return Err(ConfigError::UnknownNode {
                request: index,
                node: request.node,
            });
        }
        if request.bandwidth_mhz == 0 {
            return Err(ConfigError::ZeroBandwidth { request: index });
        }
        if request.arrival < previous {
            return Err(ConfigError::UnsortedArrivals {
                request: index,
                arrival: request.arrival,
                previous,
            });
        }
        previous = request.arrival;
    }
    Ok(())
}

/// Inserts every run resource into a fresh world. Events are not queued here.
pub fn build_world(setup: SimulationSetup) -> ConfigResult<World> {
    let SimulationSetup {
        params,
        topology,
        policy,
        requests,
    } = setup;

    let engine = AllocationEngine::new(
        topology,
        policy,
        params.band,
        params.engine_settings(),
        params.seed,
    )?;

    let mut world = World::new();
    world.insert_resource(engine);
    world.insert_resource(MetricsAggregator::default());
    world.insert_resource(RequestLedger::new(requests));
    world.insert_resource(SimulationClock::default());
    world.insert_resource(TickClock::default());
    world.insert_resource(ArrivalCursor::default());
    world.insert_resource(PendingManual::default());
    world.insert_resource(RenewalCalendar::default());
    world.insert_resource(SimulationHorizon(params.horizon_minutes));
    world.insert_resource(ManualBatchInterval(params.manual_batch_interval));
    Ok(world)
}

/// Engineered decentralized blind spot.
///
/// Nodes 0 and 2 share cell 1 but are not neighbors, so under decentralized
/// coordination the second full-band grant never sees the first. Node 1 sees
/// both and coexists with each through combination mitigation.
pub fn blind_spot_setup() -> ConfigResult<SimulationSetup> {
    let nodes = vec![
        Node::new(0, 0, 0, [0, 1]),
        Node::new(1, 0, 1, [1, 2]),
        Node::new(2, 0, 2, [1, 2]),
    ];
    let neighbors = vec![vec![NodeId(1)], vec![NodeId(0), NodeId(2)], vec![NodeId(1)]];
    let topology = Topology::custom(nodes, neighbors)?;

    let policy = ArchitecturePolicy::new(ArchitectureChoice {
        coordination: CoordinationMode::Decentralized,
        licensing: LicensingMode::Continuous,
        allocation: AllocationPlan::ArbitrarySlice,
        mitigation: MitigationStrategy::Combination,
        sensing: SensingMode::DeviceBased,
        pricing: PricingMode::NoCost,
        enforcement: EnforcementMode::Active,
        priority: PriorityDiscipline::CoPrimary,
    })?;

    let requests = vec![
        Request::new(0, 0, 0, 200, DeviceClass::FiveG),
        Request::new(1, 0, 2, 200, DeviceClass::FiveG),
        Request::new(2, 0, 1, 20, DeviceClass::Iot),
    ];
    let params = SimulationParams::default()
        .with_band(BandPlan::with_total(200))
        .with_horizon_minutes(MINUTES_PER_DAY);
    SimulationSetup::with_topology(params, topology, policy, requests)
}
