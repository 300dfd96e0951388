use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use spectrum_core::demand::DemandScenario;
use spectrum_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use spectrum_core::policy::ArchitectureChoice;
use spectrum_core::runner::run_simulation_with;
use spectrum_core::scenario::{blind_spot_setup, SchedulerKind, SimulationParams};
use spectrum_experiments::{
    enumerate_architectures, export_to_csv, export_to_json, find_best_result_index, pareto_front,
    parse_architecture, run_parallel_experiments_with_progress, run_single_experiment,
    ExperimentResult, ParameterSpace, TradeWeights,
};
use tracing::info;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "spectrum_sweep",
    about = "Run spectrum-sharing architecture simulations and sweeps",
    long_about = "Runs single architectures, per-scenario sweeps over the feasible\n\
                  morphology, or the full scenario sweep, and exports result tables."
)]
struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = Level::Info, env = "SPECTRUM_LOG_LEVEL")]
    log_level: Level,
    #[arg(long, global = true, value_enum, default_value_t = Format::Compact, env = "SPECTRUM_LOG_FORMAT")]
    log_format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one architecture and print its metrics as JSON
    Single {
        /// Eight comma-separated option labels; defaults to the reference architecture
        #[arg(long)]
        architecture: Option<String>,
        #[arg(long, value_parser = parse_demand, default_value = "medium")]
        demand: DemandScenario,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Sweep every feasible architecture under one demand scenario
    Scenario {
        #[arg(long, value_parser = parse_demand, default_value = "medium")]
        demand: DemandScenario,
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Sweep every feasible architecture under all demand scenarios
    Full {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// Run the decentralized blind-spot scenario under both schedulers
    Blindspot,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, default_value_t = 180)]
    days: u64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, value_parser = parse_scheduler, default_value = "event")]
    scheduler: SchedulerKind,
}

#[derive(Args)]
struct SweepArgs {
    #[arg(long, default_value_t = 1)]
    replications: usize,
    /// Worker threads; rayon's default when omitted
    #[arg(long)]
    threads: Option<usize>,
    /// Directory for results.csv and results.json
    #[arg(long, default_value = "sweep_results")]
    out_dir: PathBuf,
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
    Compact,
}

impl From<Format> for LogFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => LogFormat::Json,
            Format::Pretty => LogFormat::Pretty,
            Format::Compact => LogFormat::Compact,
        }
    }
}

fn parse_demand(value: &str) -> Result<DemandScenario, String> {
    DemandScenario::from_label(value)
        .ok_or_else(|| format!("unknown demand scenario {value:?} (low, medium, high)"))
}

fn parse_scheduler(value: &str) -> Result<SchedulerKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "event" => Ok(SchedulerKind::Event),
        "tick" => Ok(SchedulerKind::Tick),
        _ => Err(format!("unknown scheduler {value:?} (event, tick)")),
    }
}

// ── commands ───────────────────────────────────────────────────────

fn base_space(run: &RunArgs) -> ParameterSpace {
    ParameterSpace::grid()
        .with_base(SimulationParams::default().with_seed(run.seed))
        .scheduler(vec![run.scheduler])
        .horizon_days(vec![run.days])
}

fn single(
    architecture: Option<&str>,
    demand: DemandScenario,
    run: &RunArgs,
) -> Result<(), Box<dyn Error>> {
    let choice = match architecture {
        Some(labels) => *parse_architecture(labels)?.choice(),
        None => ArchitectureChoice::default(),
    };
    let sets = base_space(run)
        .architectures(vec![choice])
        .demand(vec![demand])
        .generate();
    for set in &sets {
        let result = run_single_experiment(set)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

fn sweep(space: ParameterSpace, args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let sets = space.replications(args.replications).generate();
    info!(runs = sets.len(), out_dir = %args.out_dir.display(), "sweep configured");
    let results = run_parallel_experiments_with_progress(&sets, args.threads, !args.no_progress)?;

    write_results(&results, &args.out_dir)?;
    report_tradespace(&results);
    Ok(())
}

fn write_results(results: &[ExperimentResult], out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let csv_path = out_dir.join("results.csv");
    let json_path = out_dir.join("results.json");
    export_to_csv(results, &csv_path)?;
    export_to_json(results, &json_path)?;
    info!(csv = %csv_path.display(), json = %json_path.display(), "results exported");
    Ok(())
}

fn report_tradespace(results: &[ExperimentResult]) {
    let front = pareto_front(results);
    println!("Pareto front ({} of {} runs):", front.len(), results.len());
    for &i in &front {
        let r = &results[i];
        println!(
            "  {:<48} {:<15} {:<8} SUE {:.4}  cost {:.2}  blocking {:.3}",
            r.short_id(),
            r.mitigation,
            r.demand,
            r.sue,
            r.coordination_cost,
            r.blocking_probability
        );
    }
    if let Some(best) = find_best_result_index(results, &TradeWeights::default()) {
        let r = &results[best];
        println!(
            "Best weighted score: {} [{} / {} / {} / {} / {}] ({})",
            r.short_id(),
            r.mitigation,
            r.sensing,
            r.pricing,
            r.enforcement,
            r.priority,
            r.demand
        );
    }
}

fn blindspot() -> Result<(), Box<dyn Error>> {
    for scheduler in [SchedulerKind::Event, SchedulerKind::Tick] {
        let outcome = run_simulation_with(blind_spot_setup()?, scheduler)?;
        println!(
            "{scheduler}: {} active, {} interfering (rate {:.3})",
            outcome.report.total_active_users,
            outcome.report.interfering_assignments,
            outcome.report.interference_rate
        );
        for assignment in &outcome.assignments {
            println!(
                "  {} on node {} {} quality {:.4}",
                assignment.class, assignment.node, assignment.interval, assignment.quality
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(
        &LogConfig::default()
            .with_level(cli.log_level.into())
            .with_format(cli.log_format.into()),
    )?;

    match cli.command {
        Commands::Single {
            architecture,
            demand,
            run,
        } => single(architecture.as_deref(), demand, &run),
        Commands::Scenario {
            demand,
            run,
            sweep: args,
        } => sweep(
            base_space(&run)
                .architectures(enumerate_architectures(true))
                .demand(vec![demand]),
            &args,
        ),
        Commands::Full { run, sweep: args } => sweep(
            base_space(&run)
                .architectures(enumerate_architectures(true))
                .demand(DemandScenario::ALL.to_vec()),
            &args,
        ),
        Commands::Blindspot => blindspot(),
    }
}
