use crate::band::{BandPlan, FrequencyInterval};
use crate::policy::AllocationPlan;

/// Every frequency interval `plan` could grant for `bandwidth_mhz` inside `range`,
/// in ascending order. The engine shuffles the list before use.
///
/// Large blocks grant whole blocks (a request never gets less than one block),
/// sub-channels grant `ceil(bw / channel)` contiguous channels and slicing grants
/// exactly the requested width at any 1 MHz offset.
pub fn frequency_candidates(
    plan: AllocationPlan,
    range: FrequencyInterval,
    bandwidth_mhz: u32,
    band: &BandPlan,
) -> Vec<FrequencyInterval> {
    if bandwidth_mhz == 0 {
        return Vec::new();
    }
    match plan {
        AllocationPlan::LargeBlocks => aligned(range, band.block_mhz, bandwidth_mhz),
        AllocationPlan::SubChannels => aligned(range, band.channel_mhz, bandwidth_mhz),
        AllocationPlan::ArbitrarySlice => {
            if bandwidth_mhz > range.width_mhz() {
                return Vec::new();
            }
            (range.start_mhz..=range.end_mhz - bandwidth_mhz)
                .map(|start| FrequencyInterval::new(start, start + bandwidth_mhz))
                .collect()
        }
    }
}

/// Contiguous runs of `unit`-sized slots aligned to the start of `range`.
fn aligned(range: FrequencyInterval, unit: u32, bandwidth_mhz: u32) -> Vec<FrequencyInterval> {
    let units = bandwidth_mhz.div_ceil(unit);
    let span = units * unit;
    let mut out = Vec::new();
    let mut start = range.start_mhz;
    while start + span <= range.end_mhz {
        out.push(FrequencyInterval::new(start, start + span));
        start += unit;
    }
    out
}
