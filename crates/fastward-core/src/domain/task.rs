//! The immutable planning task.

use crate::error::TaskError;

use super::action::Action;
use super::axiom::Axiom;
use super::fact::Fact;
use super::state::State;

/// How plan cost is accounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostMetric {
    /// Every action costs 1.
    #[default]
    Unit,
    /// Actions contribute their declared cost.
    ActionCost,
}

/// A state variable with its axiom layer and finite value range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    /// Layer for derived variables; -1 if not axiom-derived. Non-negative
    /// layers are totally ordered and processed low-to-high.
    pub axiom_layer: i32,
    pub range: usize,
    /// Human-readable name per value, carried for printing.
    pub value_names: Vec<String>,
}

/// A set of facts of which at most one may hold in any reachable state.
/// Enforced as a write-guard by the transition engine, not as a search
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutexGroup {
    pub facts: Vec<Fact>,
}

/// The complete problem description consumed by the solver.
///
/// A sub-problem is a deep copy with a replaced initial state and goal;
/// see [`PlanningTask::with_initial_and_goal`].
#[derive(Debug, Clone)]
pub struct PlanningTask {
    pub metric: CostMetric,
    pub variables: Vec<Variable>,
    pub mutexes: Vec<MutexGroup>,
    pub initial_state: State,
    pub goal: Vec<Fact>,
    pub actions: Vec<Action>,
    pub axioms: Vec<Axiom>,
}

impl PlanningTask {
    /// Returns true if every goal fact holds in `state`.
    pub fn goal_reached(&self, state: &State) -> bool {
        self.goal.iter().all(|fact| state.holds(fact))
    }

    /// Highest axiom layer over all variables, or -1 if none is derived.
    pub fn max_axiom_layer(&self) -> i32 {
        self.variables
            .iter()
            .map(|v| v.axiom_layer)
            .max()
            .unwrap_or(-1)
    }

    /// Write-guard over the mutex groups: a write of `value` to `var` is
    /// rejected when some group already has a true fact and also contains
    /// the fact being written.
    pub fn mutex_allows(&self, var: usize, value: i32, state: &State) -> bool {
        for group in &self.mutexes {
            let mut holds_some = false;
            let mut contains_write = false;
            for fact in &group.facts {
                if state.value(fact.var) == fact.value {
                    holds_some = true;
                }
                if fact.var == var && fact.value == value {
                    contains_write = true;
                }
            }
            if holds_some && contains_write {
                return false;
            }
        }
        true
    }

    /// Derives the sub-problem copy used by plan refinement: same
    /// variables, mutexes, actions and axioms, new initial state and goal.
    pub fn with_initial_and_goal(&self, initial_state: State, goal: Vec<Fact>) -> Self {
        Self {
            initial_state,
            goal,
            ..self.clone()
        }
    }

    /// Structural validation of the task: every referenced variable must
    /// exist and every non-wildcard value must lie in its range.
    pub fn validate(&self) -> Result<(), TaskError> {
        let n = self.variables.len();
        if self.initial_state.len() != n {
            return Err(TaskError::StateWidth {
                expected: n,
                actual: self.initial_state.len(),
            });
        }
        let check = |fact: &Fact, wildcard_ok: bool| -> Result<(), TaskError> {
            if fact.var >= n {
                return Err(TaskError::UnknownVariable { var: fact.var });
            }
            let range = self.variables[fact.var].range as i32;
            let in_range = fact.value >= 0 && fact.value < range;
            if !in_range && !(wildcard_ok && fact.value == -1) {
                return Err(TaskError::ValueOutOfRange {
                    var: fact.var,
                    value: fact.value,
                    range: self.variables[fact.var].range,
                });
            }
            Ok(())
        };
        for fact in &self.goal {
            check(fact, false)?;
        }
        for group in &self.mutexes {
            for fact in &group.facts {
                check(fact, false)?;
            }
        }
        for action in &self.actions {
            for pre in &action.preconditions {
                check(pre, false)?;
            }
            for eff in &action.effects {
                for cond in &eff.conditions {
                    check(cond, true)?;
                }
                check(&Fact::new(eff.var, eff.after), false)?;
                check(&Fact::new(eff.var, eff.before), true)?;
            }
        }
        for axiom in &self.axioms {
            for cond in &axiom.conditions {
                check(cond, true)?;
            }
            check(&Fact::new(axiom.var, axiom.after), false)?;
            check(&Fact::new(axiom.var, axiom.before), true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn two_var_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::Unit,
            variables: vec![
                Variable {
                    name: "a".into(),
                    axiom_layer: -1,
                    range: 2,
                    value_names: vec!["a0".into(), "a1".into()],
                },
                Variable {
                    name: "b".into(),
                    axiom_layer: -1,
                    range: 3,
                    value_names: vec!["b0".into(), "b1".into(), "b2".into()],
                },
            ],
            mutexes: vec![MutexGroup {
                facts: vec![Fact::new(0, 1), Fact::new(1, 2)],
            }],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(1, 2)],
            actions: vec![],
            axioms: vec![],
        }
    }

    #[test]
    fn goal_test_checks_every_goal_fact() {
        let task = two_var_task();
        assert!(!task.goal_reached(&State::new(vec![0, 0])));
        assert!(task.goal_reached(&State::new(vec![1, 2])));
    }

    #[test]
    fn mutex_blocks_write_when_another_group_fact_holds() {
        let task = two_var_task();
        // (0=1) holds, so writing (1=2) would put two group facts in the state.
        let state = State::new(vec![1, 0]);
        assert!(!task.mutex_allows(1, 2, &state));
        // No group fact holds: the write is allowed.
        let state = State::new(vec![0, 0]);
        assert!(task.mutex_allows(1, 2, &state));
    }

    #[test]
    fn validation_rejects_out_of_range_goal() {
        let mut task = two_var_task();
        task.goal = vec![Fact::new(1, 7)];
        assert!(matches!(
            task.validate(),
            Err(TaskError::ValueOutOfRange { var: 1, value: 7, .. })
        ));
    }

    #[test]
    fn subproblem_copy_replaces_initial_state_and_goal() {
        let task = two_var_task();
        let sub = task.with_initial_and_goal(State::new(vec![1, 1]), vec![Fact::new(0, 0)]);
        assert_eq!(sub.initial_state, State::new(vec![1, 1]));
        assert_eq!(sub.goal, vec![Fact::new(0, 0)]);
        assert_eq!(sub.variables.len(), task.variables.len());
    }
}
