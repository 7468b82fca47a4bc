//! Command-line planner frontend.
//!
//! Parses a SAS+ task, runs the selected search mode, and prints the
//! resulting plan. The refinement algorithms (`reapply`, `dfs`) first
//! produce a plan with the configured base mode, then re-solve a window
//! of it and print whichever plan won.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use fastward_core::PlanningTask;
use fastward_solver::{
    check_integrity, refine, CancellationToken, HeuristicMode, Plan, RefineMethod, SearchOutcome,
    Solver, SolverConfig, SolverError, Watchdog, Window,
};

#[derive(Debug, Parser)]
#[command(name = "fastward", version, about = "Heuristic forward-search planner for SAS+ tasks")]
struct Cli {
    /// Path to the translator output (SAS+ version 3).
    task: PathBuf,

    /// Search algorithm.
    #[arg(long, value_enum)]
    alg: Option<Algorithm>,

    /// Seed for the tie-breaking generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Time limit in seconds; negative or absent means unbounded.
    #[arg(long, allow_negative_numbers = true)]
    time_limit: Option<i64>,

    /// Verify the plan and enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Refinement window start, as a fraction of the plan length.
    #[arg(long)]
    start: Option<f64>,

    /// Refinement window end, as a fraction of the plan length.
    #[arg(long)]
    end: Option<f64>,

    /// TOML configuration file; command-line flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Random,
    Greedy,
    Hmax,
    HmaxLookahead,
    BackwardMin,
    BackwardMax,
    BackwardSum,
    /// Solve, then re-run the driver on a window of the plan.
    Reapply,
    /// Solve, then branch-and-bound a window of the plan.
    Dfs,
}

impl Algorithm {
    fn refine_method(self) -> Option<RefineMethod> {
        match self {
            Algorithm::Reapply => Some(RefineMethod::Search),
            Algorithm::Dfs => Some(RefineMethod::BoundedDfs),
            _ => None,
        }
    }

    fn mode(self) -> Option<HeuristicMode> {
        match self {
            Algorithm::Random => Some(HeuristicMode::Random),
            Algorithm::Greedy => Some(HeuristicMode::Greedy),
            Algorithm::Hmax => Some(HeuristicMode::HMax),
            Algorithm::HmaxLookahead => Some(HeuristicMode::HMaxLookahead),
            Algorithm::BackwardMin => Some(HeuristicMode::BackwardMin),
            Algorithm::BackwardMax => Some(HeuristicMode::BackwardMax),
            Algorithm::BackwardSum => Some(HeuristicMode::BackwardSum),
            Algorithm::Reapply | Algorithm::Dfs => None,
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    init_tracing(cli.debug);

    let config = build_config(&cli)?;
    let task = fastward_sas::parse_file(&cli.task)?;
    print_summary(&task);

    let token = CancellationToken::new();
    let watchdog = config
        .time_limit()
        .map(|limit| Watchdog::arm(limit, token.clone()));

    let solver = Solver::new(config.clone());
    let report = solver.solve(&task, &token);
    let code = match (report.outcome, report.plan) {
        (SearchOutcome::GoalReached, Some(plan)) => {
            let plan = match cli.alg.and_then(Algorithm::refine_method) {
                Some(method) => refine_plan(&task, plan, method, &solver, &token)?,
                None => plan,
            };
            println!("{plan}");
            if cli.debug {
                let ok = check_integrity(&task, &plan);
                println!("Integrity: {}", if ok { "ok" } else { "FAILED" });
            }
            ExitCode::SUCCESS
        }
        (SearchOutcome::Cancelled, _) => {
            eprintln!("search cancelled before a plan was found");
            ExitCode::FAILURE
        }
        _ => {
            eprintln!("no solution found");
            ExitCode::FAILURE
        }
    };

    if let Some(watchdog) = watchdog {
        watchdog.disarm();
    }
    Ok(code)
}

fn build_config(cli: &Cli) -> Result<SolverConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(limit) = cli.time_limit {
        config.time_limit_seconds = u64::try_from(limit).ok();
    }
    if let Some(alg) = cli.alg {
        match alg.mode() {
            Some(mode) => config.mode = mode,
            // The refinement algorithms pair with backward(min) for both
            // the initial solve and the re-apply sub-solve; a config
            // file may still choose a different base mode.
            None if cli.config.is_none() => config.mode = HeuristicMode::BackwardMin,
            None => {}
        }
    }
    if cli.start.is_some() || cli.end.is_some() {
        let window = Window {
            start: cli.start.unwrap_or(0.0),
            end: cli.end.unwrap_or(1.0),
        };
        window.validate()?;
        config.window = Some(window);
    }
    config.verify |= cli.debug;
    Ok(config)
}

/// Re-solves the configured window of `plan`, keeping the original when
/// nothing cheaper was found or the window turned out degenerate for
/// this plan's length.
fn refine_plan(
    task: &PlanningTask,
    plan: Plan,
    method: RefineMethod,
    solver: &Solver,
    token: &CancellationToken,
) -> Result<Plan, Box<dyn Error>> {
    let window = solver
        .config()
        .window
        .unwrap_or(Window { start: 0.0, end: 1.0 });
    let (start, end) = window.resolve(plan.len());
    match refine(task, &plan, start, end, method, solver, token) {
        Ok(report) => {
            if report.improved {
                println!(
                    "Refinement improved the plan: {} -> {}",
                    plan.total_cost, report.plan.total_cost
                );
            }
            Ok(report.plan)
        }
        Err(SolverError::DegenerateWindow { start, end }) => {
            tracing::warn!(start, end, "degenerate refinement window, keeping the plan");
            Ok(plan)
        }
        Err(error) => Err(error.into()),
    }
}

fn print_summary(task: &PlanningTask) {
    println!(
        "Task: {} variables, {} actions, {} mutex groups, {} axioms ({:?} metric)",
        task.variables.len(),
        task.actions.len(),
        task.mutexes.len(),
        task.axioms.len(),
        task.metric,
    );
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_algorithms_default_to_backward_min() {
        for alg in ["reapply", "dfs"] {
            let cli = Cli::parse_from(["fastward", "task.sas", "--alg", alg]);
            let config = build_config(&cli).unwrap();
            assert_eq!(config.mode, HeuristicMode::BackwardMin);
        }
    }

    #[test]
    fn explicit_mode_flags_map_directly() {
        let cli = Cli::parse_from([
            "fastward",
            "task.sas",
            "--alg",
            "hmax-lookahead",
            "--seed",
            "9",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.mode, HeuristicMode::HMaxLookahead);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn inverted_cli_window_is_rejected() {
        let cli = Cli::parse_from(["fastward", "task.sas", "--start", "0.8", "--end", "0.2"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn negative_time_limit_means_unbounded() {
        let cli = Cli::parse_from(["fastward", "task.sas", "--time-limit", "-1"]);
        let config = build_config(&cli).unwrap();
        assert!(config.time_limit().is_none());
    }
}
