//! Domain model for the fastward planner.
//!
//! This crate defines the immutable description of a factored planning
//! problem (variables, facts, mutex groups, actions with conditioned
//! effects, axioms, initial state, goal) together with:
//! - saturating cost arithmetic shared by all heuristics
//! - the [`FactIndex`] lookup structures used by applicability and
//!   effect-propagation queries
//!
//! Everything here is input data: per-search mutable bookkeeping lives in
//! the solver crate's search context.

pub mod cost;
pub mod domain;
pub mod error;
pub mod index;

pub use cost::{Cost, INFINITE};
pub use domain::{
    Action, Axiom, CostMetric, Effect, Fact, MutexGroup, PlanningTask, State, Variable, WILDCARD,
};
pub use error::TaskError;
pub use index::FactIndex;
