//! Derived-fact axioms.

use smallvec::SmallVec;

use super::fact::{Fact, WILDCARD};
use super::state::State;

/// A derivation rule for an axiom-layered variable.
///
/// Structurally a one-effect, zero-cost action, but axioms are never
/// queued or ranked: they fire deterministically within their variable's
/// layer whenever their conditions and the value/mutex guards pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axiom {
    /// Facts that must hold for the rule to fire.
    pub conditions: SmallVec<[Fact; 4]>,
    /// Derived variable written by the rule.
    pub var: usize,
    /// Expected prior value, or [`WILDCARD`].
    pub before: i32,
    /// Value written.
    pub after: i32,
}

impl Axiom {
    /// Returns true if every condition holds in `state`.
    pub fn conditions_hold(&self, state: &State) -> bool {
        self.conditions.iter().all(|cond| state.holds(cond))
    }

    /// Returns true if the prior-value guard passes in `state`.
    #[inline]
    pub fn before_matches(&self, state: &State) -> bool {
        self.before == WILDCARD || state.value(self.var) == self.before
    }

    /// The (variable, value) fact this rule derives.
    #[inline]
    pub fn outcome(&self) -> Fact {
        Fact::new(self.var, self.after)
    }
}
