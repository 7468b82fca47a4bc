//! Actions and their conditioned effects.

use smallvec::SmallVec;

use crate::cost::Cost;

use super::fact::{Fact, WILDCARD};
use super::state::State;
use super::task::CostMetric;

/// A guarded assignment: the effect fires only when every effect
/// condition holds and the affected variable matches `before`
/// ([`WILDCARD`] meaning any prior value).
///
/// An effect whose guards are unmet is not discarded by the engine: it is
/// deferred to the pending-effects queue and retried on later iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    /// Facts that must hold for the effect to fire.
    pub conditions: SmallVec<[Fact; 4]>,
    /// Variable written by the effect.
    pub var: usize,
    /// Expected prior value, or [`WILDCARD`].
    pub before: i32,
    /// Value written.
    pub after: i32,
}

impl Effect {
    /// Returns true if every effect condition holds in `state`.
    pub fn conditions_hold(&self, state: &State) -> bool {
        self.conditions.iter().all(|cond| state.holds(cond))
    }

    /// Returns true if the prior-value guard passes in `state`.
    #[inline]
    pub fn before_matches(&self, state: &State) -> bool {
        self.before == WILDCARD || state.value(self.var) == self.before
    }

    /// Returns true if the outcome already holds in `state`.
    #[inline]
    pub fn already_applied(&self, state: &State) -> bool {
        state.value(self.var) == self.after
    }

    /// The (variable, value) fact this effect produces.
    #[inline]
    pub fn outcome(&self) -> Fact {
        Fact::new(self.var, self.after)
    }
}

/// An operator: preconditions, conditioned effects, and a declared cost.
///
/// Actions are immutable problem data. Per-search bookkeeping (whether an
/// action has been consumed, how many of its effects have fired, its
/// current heuristic rank) lives in the solver's search context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    /// Facts that must all hold for the action to be applicable.
    pub preconditions: SmallVec<[Fact; 4]>,
    pub effects: Vec<Effect>,
    pub cost: Cost,
}

impl Action {
    /// Returns true if every precondition holds exactly in `state`.
    pub fn applicable_in(&self, state: &State) -> bool {
        self.preconditions.iter().all(|pre| state.holds(pre))
    }

    /// The cost this action contributes to a plan under `metric`.
    #[inline]
    pub fn metric_cost(&self, metric: CostMetric) -> Cost {
        match metric {
            CostMetric::Unit => 1,
            CostMetric::ActionCost => self.cost,
        }
    }
}
