//! Frequency band layout: intervals, device classes and exclusive partitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_BAND_BASE_MHZ: u32 = 37_000;
pub const DEFAULT_TOTAL_BANDWIDTH_MHZ: u32 = 600;
pub const DEFAULT_BLOCK_MHZ: u32 = 200;
pub const DEFAULT_CHANNEL_MHZ: u32 = 40;

/// Device class carried by a request. Drives priority tiers and exclusive partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceClass {
    #[serde(rename = "5G")]
    FiveG,
    #[serde(rename = "IoT")]
    Iot,
    Federal,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 3] = [DeviceClass::FiveG, DeviceClass::Iot, DeviceClass::Federal];

    pub fn label(self) -> &'static str {
        match self {
            DeviceClass::FiveG => "5G",
            DeviceClass::Iot => "IoT",
            DeviceClass::Federal => "Federal",
        }
    }

    /// Position of the class partition under exclusive access, lowest first.
    fn partition_slot(self) -> u32 {
        match self {
            DeviceClass::FiveG => 0,
            DeviceClass::Iot => 1,
            DeviceClass::Federal => 2,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open frequency interval `[start_mhz, end_mhz)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrequencyInterval {
    pub start_mhz: u32,
    pub end_mhz: u32,
}

impl FrequencyInterval {
    pub fn new(start_mhz: u32, end_mhz: u32) -> Self {
        debug_assert!(start_mhz < end_mhz, "frequency interval must be non-empty");
        Self { start_mhz, end_mhz }
    }

    pub fn width_mhz(&self) -> u32 {
        self.end_mhz - self.start_mhz
    }

    /// Strict overlap of half-open intervals; touching edges do not overlap.
    pub fn overlaps(&self, other: &FrequencyInterval) -> bool {
        self.start_mhz < other.end_mhz && other.start_mhz < self.end_mhz
    }

    pub fn contains(&self, other: &FrequencyInterval) -> bool {
        self.start_mhz <= other.start_mhz && other.end_mhz <= self.end_mhz
    }
}

impl fmt::Display for FrequencyInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} MHz", self.start_mhz, self.end_mhz)
    }
}

/// Managed band plus the granularity used by block and channel allocation plans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPlan {
    pub base_mhz: u32,
    pub total_mhz: u32,
    pub block_mhz: u32,
    pub channel_mhz: u32,
}

impl Default for BandPlan {
    fn default() -> Self {
        Self {
            base_mhz: DEFAULT_BAND_BASE_MHZ,
            total_mhz: DEFAULT_TOTAL_BANDWIDTH_MHZ,
            block_mhz: DEFAULT_BLOCK_MHZ,
            channel_mhz: DEFAULT_CHANNEL_MHZ,
        }
    }
}

impl BandPlan {
    /// Band of `total_mhz` starting at the default base, default granularity.
    pub fn with_total(total_mhz: u32) -> Self {
        Self {
            total_mhz,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.total_mhz == 0 {
            return Err(ConfigError::InvalidBand("total bandwidth must be > 0".into()));
        }
        if self.block_mhz == 0 || self.channel_mhz == 0 {
            return Err(ConfigError::InvalidBand(
                "block and channel sizes must be > 0".into(),
            ));
        }
        if self.base_mhz.checked_add(self.total_mhz).is_none() {
            return Err(ConfigError::InvalidBand("band end overflows".into()));
        }
        Ok(())
    }

    pub fn full(&self) -> FrequencyInterval {
        FrequencyInterval::new(self.base_mhz, self.base_mhz + self.total_mhz)
    }

    /// Contiguous third of the band reserved for `class` under exclusive access.
    ///
    /// The upper partition absorbs the remainder when the band is not divisible by three.
    pub fn exclusive_partition(&self, class: DeviceClass) -> FrequencyInterval {
        let share = self.total_mhz / 3;
        let slot = class.partition_slot();
        let start = self.base_mhz + share * slot;
        let end = if slot == 2 {
            self.base_mhz + self.total_mhz
        } else {
            start + share
        };
        FrequencyInterval { start_mhz: start, end_mhz: end }
    }
}
