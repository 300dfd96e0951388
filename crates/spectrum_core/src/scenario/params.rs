use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::allocation::{EngineSettings, ManualDelayModel};
use crate::band::BandPlan;
use crate::demand::{DemandProfile, DemandScenario};
use crate::error::{ConfigError, ConfigResult};
use crate::policy::{CONTINUOUS_RENEWAL_INTERVAL, MINUTES_PER_DAY, PERIODIC_RENEWAL_INTERVAL};

/// Default horizon: 180 days.
pub const DEFAULT_HORIZON_MINUTES: u64 = 180 * MINUTES_PER_DAY;

/// Default seed shared by the engine and the demand generator.
pub const DEFAULT_SEED: u64 = 42;

/// Simulation end time in minutes. The runners stop before any event at or after it.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationHorizon(pub u64);

/// Tick scheduler: process due manual requests every N minutes.
#[derive(Debug, Clone, Copy, Resource)]
pub struct ManualBatchInterval(pub u64);

impl Default for ManualBatchInterval {
    fn default() -> Self {
        Self(MINUTES_PER_DAY)
    }
}

/// Time-advance strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    /// One minute per step.
    Tick,
    /// Discrete event queue.
    #[default]
    Event,
}

impl SchedulerKind {
    pub fn label(self) -> &'static str {
        match self {
            SchedulerKind::Tick => "tick",
            SchedulerKind::Event => "event",
        }
    }
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub seed: u64,
    pub horizon_minutes: u64,
    /// Grid size in cells; nodes sit on the (rows + 1) x (cols + 1) intersections.
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub band: BandPlan,
    pub hybrid_global_probability: f64,
    pub periodic_interval: u64,
    pub continuous_interval: u64,
    pub manual_delay: ManualDelayModel,
    /// Tick scheduler only.
    pub manual_batch_interval: u64,
    pub scheduler: SchedulerKind,
    pub demand: DemandScenario,
    pub demand_profile: DemandProfile,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            horizon_minutes: DEFAULT_HORIZON_MINUTES,
            grid_rows: 3,
            grid_cols: 3,
            band: BandPlan::default(),
            hybrid_global_probability: 0.5,
            periodic_interval: PERIODIC_RENEWAL_INTERVAL,
            continuous_interval: CONTINUOUS_RENEWAL_INTERVAL,
            manual_delay: ManualDelayModel::ByCoordination,
            manual_batch_interval: MINUTES_PER_DAY,
            scheduler: SchedulerKind::Event,
            demand: DemandScenario::Medium,
            demand_profile: DemandProfile::default(),
        }
    }
}

impl SimulationParams {
    /// Parses JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_horizon_minutes(mut self, minutes: u64) -> Self {
        self.horizon_minutes = minutes;
        self
    }

    pub fn with_horizon_days(mut self, days: u64) -> Self {
        self.horizon_minutes = days * MINUTES_PER_DAY;
        self
    }

    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid_rows = rows;
        self.grid_cols = cols;
        self
    }

    pub fn with_band(mut self, band: BandPlan) -> Self {
        self.band = band;
        self
    }

    pub fn with_hybrid_global_probability(mut self, probability: f64) -> Self {
        self.hybrid_global_probability = probability;
        self
    }

    pub fn with_manual_delay(mut self, model: ManualDelayModel) -> Self {
        self.manual_delay = model;
        self
    }

    pub fn with_manual_batch_interval(mut self, minutes: u64) -> Self {
        self.manual_batch_interval = minutes;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_demand(mut self, demand: DemandScenario) -> Self {
        self.demand = demand;
        self
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            hybrid_global_probability: self.hybrid_global_probability,
            periodic_interval: self.periodic_interval,
            continuous_interval: self.continuous_interval,
            manual_delay: self.manual_delay,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.horizon_minutes == 0 {
            return Err(ConfigError::InvalidParameter("horizon must be > 0".into()));
        }
        if self.manual_batch_interval == 0 {
            return Err(ConfigError::InvalidParameter(
                "manual batch interval must be > 0".into(),
            ));
        }
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(ConfigError::InvalidTopology(
                "grid needs at least one row and one column of cells".into(),
            ));
        }
        self.band.validate()?;
        self.engine_settings().validate()
    }
}
