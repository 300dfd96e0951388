use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the spectrum-sharing simulation workspace",
    long_about = "A unified CLI for running the reference scenario, architecture sweeps,\n\
                  benchmarks, and CI checks in the spectrum-sharing workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference architecture over 180 days of medium demand
    Run,
    /// Sweep every feasible architecture
    Sweep {
        /// Demand scenario to sweep; all three when omitted
        #[arg(value_enum)]
        demand: Option<Demand>,
        /// Simulated days per run
        #[arg(long, default_value_t = 180)]
        days: u64,
        /// Output directory for results.csv and results.json
        #[arg(long, default_value = "sweep_results")]
        out_dir: String,
    },
    /// Reproduce the decentralized blind spot under both schedulers
    Blindspot,
    /// Run Criterion benchmarks
    Bench,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Demand {
    Low,
    Medium,
    High,
}

impl Demand {
    fn as_arg(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the example scenario and the blind-spot check
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    match Command::new("cargo").args(args).status() {
        Ok(status) => status,
        Err(error) => {
            eprintln!("failed to execute cargo: {error}");
            exit(1);
        }
    }
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_sweep_binary(args: &[&str]) {
    let mut full = vec![
        "run",
        "-p",
        "spectrum_experiments",
        "--bin",
        "spectrum_sweep",
        "--release",
        "--",
    ];
    full.extend_from_slice(args);
    run_cargo(&full);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test spectrum_core");
    run_cargo(&["test", "-p", "spectrum_core"]);

    step("Test spectrum_experiments");
    run_cargo(&["test", "-p", "spectrum_experiments"]);
}

fn ci_examples() {
    step("Run scenario_run (reference architecture, 180 days)");
    run_cargo(&[
        "run",
        "-p",
        "spectrum_core",
        "--example",
        "scenario_run",
        "--release",
    ]);

    step("Run blind-spot check");
    run_sweep_binary(&["blindspot"]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "spectrum_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_cargo(&[
                "run",
                "-p",
                "spectrum_core",
                "--example",
                "scenario_run",
                "--release",
            ]);
        }
        Commands::Sweep {
            demand,
            days,
            out_dir,
        } => {
            let days = days.to_string();
            match demand {
                Some(demand) => run_sweep_binary(&[
                    "scenario",
                    "--demand",
                    demand.as_arg(),
                    "--days",
                    &days,
                    "--out-dir",
                    &out_dir,
                ]),
                None => run_sweep_binary(&["full", "--days", &days, "--out-dir", &out_dir]),
            }
        }
        Commands::Blindspot => run_sweep_binary(&["blindspot"]),
        Commands::Bench => ci_bench(),
        Commands::Ci { job } => match job {
            CiJob::Check => ci_check(),
            CiJob::Examples => ci_examples(),
            CiJob::Bench => ci_bench(),
            CiJob::All => {
                ci_check();
                ci_examples();
                ci_bench();
            }
        },
    }
}
