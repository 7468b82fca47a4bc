//! The factored planning problem: facts, actions, axioms, task, state.
//!
//! - [`PlanningTask`] is the immutable problem description.
//! - [`State`] is a dense value vector indexed by variable.
//! - [`Fact`] is the shared vocabulary of preconditions, effects, goals
//!   and mutexes.

mod action;
mod axiom;
mod fact;
mod state;
mod task;

pub use action::{Action, Effect};
pub use axiom::Axiom;
pub use fact::{Fact, WILDCARD};
pub use state::State;
pub use task::{CostMetric, MutexGroup, PlanningTask, Variable};
