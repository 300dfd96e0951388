use super::*;
use spectrum_core::policy::{LicensingMode, MitigationStrategy};

fn two_architectures() -> Vec<ArchitectureChoice> {
    vec![
        ArchitectureChoice::default(),
        ArchitectureChoice::default()
            .with_licensing(LicensingMode::Continuous)
            .with_mitigation(MitigationStrategy::PowerControl),
    ]
}

#[test]
fn test_empty_space_is_one_default_run() {
    let sets = ParameterSpace::grid().generate();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].architecture, ArchitectureChoice::default());
    assert_eq!(sets[0].seed, 42);
    assert_eq!(sets[0].simulation_params(), SimulationParams::default());
}

#[test]
fn test_grid_search_multiple_dimensions() {
    let space = ParameterSpace::grid()
        .architectures(two_architectures())
        .demand(DemandScenario::ALL.to_vec())
        .scheduler(vec![SchedulerKind::Event, SchedulerKind::Tick]);
    let sets = space.generate();
    assert_eq!(sets.len(), 12);
    assert_eq!(space.len(), 12);
    assert!(sets.iter().enumerate().all(|(i, s)| s.run_id == i));
    assert_eq!(sets[1].params.scheduler, SchedulerKind::Tick);
    assert_eq!(sets[2].params.demand, DemandScenario::Medium);
}

#[test]
fn test_replications_share_seeds_across_architectures() {
    let sets = ParameterSpace::grid()
        .architectures(two_architectures())
        .replications(3)
        .generate();
    assert_eq!(sets.len(), 6);
    let first: Vec<u64> = sets[..3].iter().map(|s| s.seed).collect();
    let second: Vec<u64> = sets[3..].iter().map(|s| s.seed).collect();
    assert_eq!(first, second);
    assert_eq!(first[0], 42);
    assert_ne!(first[1], first[2]);
    assert_eq!(sets[0].experiment_id, sets[1].experiment_id);
}

#[test]
fn test_horizon_days_become_minutes() {
    let sets = ParameterSpace::grid().horizon_days(vec![1, 30]).generate();
    assert_eq!(sets[0].params.horizon_minutes, 1_440);
    assert_eq!(sets[1].params.horizon_minutes, 43_200);
    assert!(sets[1].experiment_id.ends_with("-30d"));
}

#[test]
fn test_setup_generates_demand_for_the_seed() {
    let sets = ParameterSpace::grid()
        .horizon_days(vec![10])
        .replications(2)
        .generate();
    let a = sets[0].setup().expect("setup");
    let b = sets[1].setup().expect("setup");
    assert_eq!(a.requests().len(), 10);
    assert_eq!(a.requests().len(), b.requests().len());
    assert_ne!(a.params().seed, b.params().seed);
}

#[test]
fn test_infeasible_architecture_fails_setup() {
    let set = ParameterSet::new(
        SimulationParams::default(),
        ArchitectureChoice::default().with_priority(spectrum_core::policy::PriorityDiscipline::Exclusive),
        "bad".into(),
        0,
        1,
    );
    assert!(set.setup().is_err());
}

#[test]
fn test_random_sampling_is_unique_and_bounded() {
    let space = ParameterSpace::feasible_architectures().demand(DemandScenario::ALL.to_vec());
    let sets = space.sample_random(10, 7);
    assert_eq!(sets.len(), 10);
    let mut keys: Vec<_> = sets
        .iter()
        .map(|s| (s.architecture, s.params.demand))
        .collect();
    keys.sort_by_key(|(a, d)| (a.to_string(), d.label()));
    keys.dedup();
    assert_eq!(keys.len(), 10);
    assert!(sets.iter().all(|s| s.architecture.is_feasible()));

    let small = ParameterSpace::grid().demand(vec![DemandScenario::Low, DemandScenario::High]);
    assert_eq!(small.sample_random(10, 7).len(), 2);
}

#[test]
fn test_random_sampling_is_reproducible() {
    let space = ParameterSpace::feasible_architectures();
    let a: Vec<_> = space.sample_random(5, 99).into_iter().map(|s| s.architecture).collect();
    let b: Vec<_> = space.sample_random(5, 99).into_iter().map(|s| s.architecture).collect();
    assert_eq!(a, b);
}
