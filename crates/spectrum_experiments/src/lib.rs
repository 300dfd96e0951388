//! Parallel architecture sweeps for the spectrum-sharing simulator.
//!
//! Enumerates the architecture morphology, runs every combination against
//! generated demand on a rayon pool, flattens each run into an
//! [`ExperimentResult`] row and ranks the trade space.
//!
//! # Quick Start
//!
//! ```no_run
//! use spectrum_core::demand::DemandScenario;
//! use spectrum_experiments::{
//!     find_best_result_index, pareto_front, run_parallel_experiments, ParameterSpace,
//!     TradeWeights,
//! };
//!
//! let sets = ParameterSpace::feasible_architectures()
//!     .demand(vec![DemandScenario::High])
//!     .horizon_days(vec![30])
//!     .generate();
//!
//! let results = run_parallel_experiments(&sets, None)?;
//! let front = pareto_front(&results);
//! let best = find_best_result_index(&results, &TradeWeights::default());
//! # Ok::<(), spectrum_experiments::ExperimentError>(())
//! ```
//!
//! # Modules
//!
//! - [`morphology`]: architecture enumeration and lookup by label
//! - [`parameters`]: parameter space (grid search, random sampling)
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: flattened result rows
//! - [`tradespace`]: weighted scores and the Pareto front
//! - [`export`]: CSV and JSON export

pub mod export;
pub mod metrics;
pub mod morphology;
pub mod parameters;
pub mod runner;
pub mod tradespace;

pub use export::{export_to_csv, export_to_json};
pub use metrics::ExperimentResult;
pub use morphology::{architecture_by_name, enumerate_architectures, parse_architecture};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{
    run_parallel_experiments, run_parallel_experiments_with_progress, run_single_experiment,
    ExperimentError,
};
pub use tradespace::{calculate_trade_scores, find_best_result_index, pareto_front, TradeWeights};
