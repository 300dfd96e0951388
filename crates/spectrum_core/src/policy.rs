//! Architecture policy: the eight design dimensions of a spectrum-sharing
//! architecture, the feasibility filter and the per-policy constants the
//! engine and metrics derive from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::band::DeviceClass;
use crate::error::{ConfigError, ConfigResult};

pub const MINUTES_PER_DAY: u64 = 1440;
pub const PERIODIC_RENEWAL_INTERVAL: u64 = MINUTES_PER_DAY;
pub const CONTINUOUS_RENEWAL_INTERVAL: u64 = 1;
pub const RENEWAL_QUERY_COST: f64 = 0.5;

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parses the display label (case-insensitive, `-`/`_`/space agnostic).
            pub fn from_label(label: &str) -> Option<Self> {
                let wanted = normalize_label(label);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_label(v.label()) == wanted)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

labelled_enum! {
    /// Which assignments an admission decision can see.
    pub enum CoordinationMode {
        Centralized => "Centralized",
        Decentralized => "Decentralized",
        Hybrid => "Hybrid",
    }
}

labelled_enum! {
    /// How long grants live before re-validation.
    pub enum LicensingMode {
        Manual => "Manual",
        Periodic => "Semi-Dynamic",
        Continuous => "Dynamic",
    }
}

labelled_enum! {
    pub enum AllocationPlan {
        LargeBlocks => "Large Blocks",
        SubChannels => "Sub Channels",
        ArbitrarySlice => "Freq Slicing",
    }
}

labelled_enum! {
    pub enum MitigationStrategy {
        None => "No Mitigation",
        PowerControl => "Power Control",
        Beamforming => "Beamforming",
        Combination => "Combination",
        FrequencyHopping => "Frequency Hopping",
    }
}

labelled_enum! {
    pub enum SensingMode {
        DeviceBased => "Device Based",
        InfrastructureSensors => "Infrastructure Sensors",
        DatabaseOnly => "Database Only",
    }
}

labelled_enum! {
    pub enum PricingMode {
        NoCost => "No Cost",
        UsageBased => "Usage Based",
        AuctionBased => "Auction Based",
    }
}

labelled_enum! {
    pub enum EnforcementMode {
        Active => "Active",
        Passive => "Passive",
    }
}

labelled_enum! {
    pub enum PriorityDiscipline {
        Hierarchical => "Hierarchical",
        CoPrimary => "Co-Primary",
        Exclusive => "Exclusive",
    }
}

impl MitigationStrategy {
    /// Strategies swept by the morphology enumerator. Frequency hopping is
    /// constructible but never resolves a spatial overlap, so it is left out.
    pub const CANONICAL: &'static [MitigationStrategy] = &[
        MitigationStrategy::None,
        MitigationStrategy::PowerControl,
        MitigationStrategy::Beamforming,
        MitigationStrategy::Combination,
    ];
}

/// Rules of the feasibility filter, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeasibilityRule {
    ContinuousWithDatabaseOnlySensing,
    ContinuousWithAuctionPricing,
    DecentralizedWithAuctionPricing,
    ExclusiveRequiresManualCentralized,
    ContinuousWithPassiveEnforcement,
}

impl fmt::Display for FeasibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FeasibilityRule::ContinuousWithDatabaseOnlySensing => {
                "dynamic licensing cannot use database-only sensing"
            }
            FeasibilityRule::ContinuousWithAuctionPricing => {
                "dynamic licensing cannot use auction-based pricing"
            }
            FeasibilityRule::DecentralizedWithAuctionPricing => {
                "decentralized coordination cannot use auction-based pricing"
            }
            FeasibilityRule::ExclusiveRequiresManualCentralized => {
                "exclusive priority requires manual licensing and centralized coordination"
            }
            FeasibilityRule::ContinuousWithPassiveEnforcement => {
                "dynamic licensing cannot use passive enforcement"
            }
        };
        f.write_str(text)
    }
}

/// Unchecked combination of the eight dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchitectureChoice {
    pub coordination: CoordinationMode,
    pub licensing: LicensingMode,
    pub allocation: AllocationPlan,
    pub mitigation: MitigationStrategy,
    pub sensing: SensingMode,
    pub pricing: PricingMode,
    pub enforcement: EnforcementMode,
    pub priority: PriorityDiscipline,
}

impl Default for ArchitectureChoice {
    fn default() -> Self {
        Self {
            coordination: CoordinationMode::Centralized,
            licensing: LicensingMode::Periodic,
            allocation: AllocationPlan::SubChannels,
            mitigation: MitigationStrategy::None,
            sensing: SensingMode::DeviceBased,
            pricing: PricingMode::NoCost,
            enforcement: EnforcementMode::Active,
            priority: PriorityDiscipline::CoPrimary,
        }
    }
}

impl ArchitectureChoice {
    pub fn with_coordination(mut self, coordination: CoordinationMode) -> Self {
        self.coordination = coordination;
        self
    }

    pub fn with_licensing(mut self, licensing: LicensingMode) -> Self {
        self.licensing = licensing;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationPlan) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_mitigation(mut self, mitigation: MitigationStrategy) -> Self {
        self.mitigation = mitigation;
        self
    }

    pub fn with_sensing(mut self, sensing: SensingMode) -> Self {
        self.sensing = sensing;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingMode) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_enforcement(mut self, enforcement: EnforcementMode) -> Self {
        self.enforcement = enforcement;
        self
    }

    pub fn with_priority(mut self, priority: PriorityDiscipline) -> Self {
        self.priority = priority;
        self
    }

    /// First violated feasibility rule, if any.
    pub fn violated_rule(&self) -> Option<FeasibilityRule> {
        let continuous = self.licensing == LicensingMode::Continuous;
        if continuous && self.sensing == SensingMode::DatabaseOnly {
            return Some(FeasibilityRule::ContinuousWithDatabaseOnlySensing);
        }
        if continuous && self.pricing == PricingMode::AuctionBased {
            return Some(FeasibilityRule::ContinuousWithAuctionPricing);
        }
        if self.coordination == CoordinationMode::Decentralized
            && self.pricing == PricingMode::AuctionBased
        {
            return Some(FeasibilityRule::DecentralizedWithAuctionPricing);
        }
        if self.priority == PriorityDiscipline::Exclusive
            && (self.licensing != LicensingMode::Manual
                || self.coordination != CoordinationMode::Centralized)
        {
            return Some(FeasibilityRule::ExclusiveRequiresManualCentralized);
        }
        if continuous && self.enforcement == EnforcementMode::Passive {
            return Some(FeasibilityRule::ContinuousWithPassiveEnforcement);
        }
        None
    }

    pub fn is_feasible(&self) -> bool {
        self.violated_rule().is_none()
    }

    /// Short identifier used in result tables, e.g. `Centralized-Dynamic-Sub Channels`.
    pub fn short_id(&self) -> String {
        format!("{}-{}-{}", self.coordination, self.licensing, self.allocation)
    }
}

impl fmt::Display for ArchitectureChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}/{}/{}",
            self.coordination,
            self.licensing,
            self.allocation,
            self.mitigation,
            self.sensing,
            self.pricing,
            self.enforcement,
            self.priority
        )
    }
}

/// Feasible, immutable architecture for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArchitecturePolicy {
    choice: ArchitectureChoice,
}

impl ArchitecturePolicy {
    pub fn new(choice: ArchitectureChoice) -> ConfigResult<Self> {
        match choice.violated_rule() {
            Some(rule) => Err(ConfigError::Infeasible {
                architecture: choice.to_string(),
                rule,
            }),
            None => Ok(Self { choice }),
        }
    }

    pub fn choice(&self) -> &ArchitectureChoice {
        &self.choice
    }

    pub fn coordination(&self) -> CoordinationMode {
        self.choice.coordination
    }

    pub fn licensing(&self) -> LicensingMode {
        self.choice.licensing
    }

    pub fn allocation(&self) -> AllocationPlan {
        self.choice.allocation
    }

    pub fn mitigation(&self) -> MitigationStrategy {
        self.choice.mitigation
    }

    pub fn priority(&self) -> PriorityDiscipline {
        self.choice.priority
    }

    pub fn enforcement(&self) -> EnforcementMode {
        self.choice.enforcement
    }

    pub fn is_hierarchical(&self) -> bool {
        self.choice.priority == PriorityDiscipline::Hierarchical
    }

    pub fn is_exclusive(&self) -> bool {
        self.choice.priority == PriorityDiscipline::Exclusive
    }

    /// Priority tier of a device class, 0 being the highest.
    pub fn tier(&self, class: DeviceClass) -> u8 {
        if !self.is_hierarchical() {
            return 0;
        }
        match class {
            DeviceClass::Federal => 0,
            DeviceClass::FiveG => 1,
            DeviceClass::Iot => 2,
        }
    }

    /// Coordination query units charged per admission.
    pub fn initial_query_cost(&self) -> f64 {
        match self.choice.coordination {
            CoordinationMode::Centralized => 1.0,
            CoordinationMode::Decentralized => 0.5,
            CoordinationMode::Hybrid => 0.75,
        }
    }

    pub fn renewal_query_cost(&self) -> f64 {
        RENEWAL_QUERY_COST
    }

    /// Fixed human-review delay for manual licensing, by coordination topology.
    pub fn manual_delay(&self) -> u64 {
        match self.choice.coordination {
            CoordinationMode::Centralized => 30 * MINUTES_PER_DAY,
            CoordinationMode::Hybrid => 20 * MINUTES_PER_DAY,
            CoordinationMode::Decentralized => 10 * MINUTES_PER_DAY,
        }
    }

    /// Product of the plan, enforcement and priority cost factors.
    pub fn cost_multiplier(&self) -> f64 {
        let plan = match self.choice.allocation {
            AllocationPlan::LargeBlocks => 1.0,
            AllocationPlan::SubChannels => 1.5,
            AllocationPlan::ArbitrarySlice => 2.0,
        };
        let enforcement = match self.choice.enforcement {
            EnforcementMode::Active => 2.0,
            EnforcementMode::Passive => 1.0,
        };
        let priority = match self.choice.priority {
            PriorityDiscipline::Exclusive => 1.0,
            PriorityDiscipline::Hierarchical => 1.5,
            PriorityDiscipline::CoPrimary => 2.0,
        };
        plan * enforcement * priority
    }
}

impl TryFrom<ArchitectureChoice> for ArchitecturePolicy {
    type Error = ConfigError;

    fn try_from(choice: ArchitectureChoice) -> ConfigResult<Self> {
        Self::new(choice)
    }
}

impl<'de> Deserialize<'de> for ArchitecturePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let choice = ArchitectureChoice::deserialize(deserializer)?;
        ArchitecturePolicy::new(choice).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ArchitecturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.choice.fmt(f)
    }
}
