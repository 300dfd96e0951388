//! Architecture morphology: the Cartesian product of the eight decision dimensions.

use spectrum_core::error::{ConfigError, ConfigResult};
use spectrum_core::policy::{
    AllocationPlan, ArchitectureChoice, ArchitecturePolicy, CoordinationMode, EnforcementMode,
    LicensingMode, MitigationStrategy, PriorityDiscipline, PricingMode, SensingMode,
};

/// Every combination of the dimension options, in dimension order. Mitigation
/// uses the canonical set. With `apply_filter`, infeasible combinations are dropped.
pub fn enumerate_architectures(apply_filter: bool) -> Vec<ArchitectureChoice> {
    let mut out = Vec::new();
    for &coordination in CoordinationMode::ALL {
        for &licensing in LicensingMode::ALL {
            for &allocation in AllocationPlan::ALL {
                for &mitigation in MitigationStrategy::CANONICAL {
                    for &sensing in SensingMode::ALL {
                        for &pricing in PricingMode::ALL {
                            for &enforcement in EnforcementMode::ALL {
                                for &priority in PriorityDiscipline::ALL {
                                    let choice = ArchitectureChoice {
                                        coordination,
                                        licensing,
                                        allocation,
                                        mitigation,
                                        sensing,
                                        pricing,
                                        enforcement,
                                        priority,
                                    };
                                    if !apply_filter || choice.is_feasible() {
                                        out.push(choice);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    out
}

fn parse<T>(dimension: &str, label: &str, from_label: fn(&str) -> Option<T>) -> ConfigResult<T> {
    from_label(label).ok_or_else(|| {
        ConfigError::InvalidParameter(format!("unknown {dimension} option {label:?}"))
    })
}

/// Builds a feasible policy from the eight option labels, in dimension order
/// (e.g. `["Centralized", "Semi-Dynamic", "Sub Channels", "Power Control", ...]`).
pub fn architecture_by_name(labels: [&str; 8]) -> ConfigResult<ArchitecturePolicy> {
    let [coordination, licensing, allocation, mitigation, sensing, pricing, enforcement, priority] =
        labels;
    let choice = ArchitectureChoice {
        coordination: parse("coordination", coordination, CoordinationMode::from_label)?,
        licensing: parse("licensing", licensing, LicensingMode::from_label)?,
        allocation: parse("allocation", allocation, AllocationPlan::from_label)?,
        mitigation: parse("mitigation", mitigation, MitigationStrategy::from_label)?,
        sensing: parse("sensing", sensing, SensingMode::from_label)?,
        pricing: parse("pricing", pricing, PricingMode::from_label)?,
        enforcement: parse("enforcement", enforcement, EnforcementMode::from_label)?,
        priority: parse("priority", priority, PriorityDiscipline::from_label)?,
    };
    ArchitecturePolicy::new(choice)
}

/// Parses a comma-separated list of eight labels, as accepted on the command line.
pub fn parse_architecture(spec: &str) -> ConfigResult<ArchitecturePolicy> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    let labels: [&str; 8] = parts.as_slice().try_into().map_err(|_| {
        ConfigError::InvalidParameter(format!(
            "expected 8 comma-separated options, got {}",
            parts.len()
        ))
    })?;
    architecture_by_name(labels)
}
