//! Search engine for the fastward planner.
//!
//! This crate provides:
//! - the per-search mutable [`SearchContext`] and transition engine
//!   (applicability, axioms, conditional effects, pending-effect retries)
//! - heuristic estimators (recursive h_max, backward cost propagation,
//!   two-ply lookahead)
//! - the greedy search driver ([`Solver::solve`])
//! - the bounded depth-first branch-and-bound refiner
//! - plan segmentation/merging and integrity verification
//! - cooperative cancellation and the deadline watchdog

pub mod config;
pub mod context;
pub mod dfs;
pub mod error;
pub mod heuristic;
pub mod plan;
pub mod refine;
pub mod search;
pub mod termination;
pub mod verify;

pub use config::{ConfigError, SolverConfig, Window};
pub use context::{project, SearchContext};
pub use dfs::bounded_dfs;
pub use error::SolverError;
pub use heuristic::HeuristicMode;
pub use plan::{Plan, PlanStep};
pub use refine::{refine, RefineMethod, RefineReport};
pub use search::{SearchOutcome, SolveReport, Solver};
pub use termination::{CancellationToken, Watchdog};
pub use verify::check_integrity;
