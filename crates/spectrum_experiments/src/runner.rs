//! Parallel simulation execution using rayon.
//!
//! Each run builds its own world from its parameter set; runs share no state,
//! so results come back in input order regardless of thread count.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use spectrum_core::error::ConfigError;
use spectrum_core::runner::run_simulation;
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics::ExperimentResult;
use crate::parameters::ParameterSet;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("run {run_id} ({experiment_id}): {source}")]
    Config {
        run_id: usize,
        experiment_id: String,
        #[source]
        source: ConfigError,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

/// Run a single simulation with the given parameter set.
pub fn run_single_experiment(set: &ParameterSet) -> Result<ExperimentResult, ExperimentError> {
    let config_error = |source| ExperimentError::Config {
        run_id: set.run_id,
        experiment_id: set.experiment_id.clone(),
        source,
    };
    let setup = set.setup().map_err(config_error)?;
    let outcome = run_simulation(setup).map_err(config_error)?;
    debug!(
        run_id = set.run_id,
        experiment = %set.experiment_id,
        sue = outcome.report.sue,
        "experiment finished"
    );
    Ok(ExperimentResult::from_outcome(set, &outcome))
}

/// Run multiple simulations in parallel with a progress bar.
pub fn run_parallel_experiments(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
) -> Result<Vec<ExperimentResult>, ExperimentError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with optional progress bar.
///
/// `num_threads` of `None` uses rayon's default. The first failing run aborts
/// the sweep.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ExperimentResult>, ExperimentError> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    info!(runs = total, threads = pool.current_num_threads(), "starting sweep");
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|set| {
                let result = run_single_experiment(set);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use spectrum_core::demand::DemandScenario;
    use spectrum_core::policy::{ArchitectureChoice, LicensingMode, PriorityDiscipline};
    use spectrum_core::scenario::SchedulerKind;

    #[test]
    fn test_single_experiment() {
        let sets = ParameterSpace::grid().horizon_days(vec![7]).generate();
        let result = run_single_experiment(&sets[0]).expect("run");
        assert_eq!(result.total_requests, 7);
        assert_eq!(result.granted + result.denied, 7 + result.revocations);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sets = ParameterSpace::grid()
            .architectures(vec![
                ArchitectureChoice::default(),
                ArchitectureChoice::default().with_licensing(LicensingMode::Continuous),
            ])
            .demand(vec![DemandScenario::Medium, DemandScenario::High])
            .horizon_days(vec![10])
            .generate();
        let parallel = run_parallel_experiments_with_progress(&sets, Some(2), false).expect("sweep");
        assert_eq!(parallel.len(), 4);
        for (set, result) in sets.iter().zip(&parallel) {
            assert_eq!(result.run_id, set.run_id);
            assert_eq!(result, &run_single_experiment(set).expect("run"));
        }
    }

    #[test]
    fn test_schedulers_agree_in_a_sweep() {
        let sets = ParameterSpace::grid()
            .scheduler(vec![SchedulerKind::Event, SchedulerKind::Tick])
            .horizon_days(vec![5])
            .generate();
        let results = run_parallel_experiments_with_progress(&sets, Some(2), false).expect("sweep");
        assert_eq!(results[0].granted, results[1].granted);
        assert_eq!(results[0].denied, results[1].denied);
        assert!((results[0].sue - results[1].sue).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_set_is_reported() {
        let sets = ParameterSpace::grid()
            .architectures(vec![
                ArchitectureChoice::default().with_priority(PriorityDiscipline::Exclusive)
            ])
            .generate();
        let err = run_parallel_experiments_with_progress(&sets, Some(1), false)
            .expect_err("infeasible");
        assert!(matches!(err, ExperimentError::Config { run_id: 0, .. }));
    }
}
