//! Fact enumeration and reverse lookup maps.
//!
//! Built once per task before any heuristic or search call. The index
//! assigns a stable id to every fact appearing anywhere in the problem
//! and answers two reverse queries: which actions require a fact as a
//! precondition, and which actions produce it as an effect outcome.

use std::collections::HashMap;

use crate::domain::{Fact, PlanningTask};

/// Canonical fact enumeration plus precondition/effect reverse maps.
///
/// Building is a pure function of the task: re-running it on an
/// unchanged action set yields an equivalent index.
#[derive(Debug, Clone, Default)]
pub struct FactIndex {
    facts: Vec<Fact>,
    ids: HashMap<Fact, usize>,
    by_precondition: HashMap<Fact, Vec<usize>>,
    by_effect: HashMap<Fact, Vec<usize>>,
    no_precondition: Vec<usize>,
}

impl FactIndex {
    /// Enumerates every fact seen in the initial state, the goal, any
    /// action precondition or effect outcome, and any axiom outcome.
    pub fn build(task: &PlanningTask) -> Self {
        let mut index = FactIndex::default();

        for (var, &value) in task.initial_state.values().iter().enumerate() {
            index.intern(Fact::new(var, value));
        }
        for &goal in &task.goal {
            index.intern(goal);
        }
        for (action_idx, action) in task.actions.iter().enumerate() {
            if action.preconditions.is_empty() {
                index.no_precondition.push(action_idx);
            }
            for &pre in &action.preconditions {
                index.intern(pre);
                index.by_precondition.entry(pre).or_default().push(action_idx);
            }
            for effect in &action.effects {
                let outcome = effect.outcome();
                index.intern(outcome);
                index.by_effect.entry(outcome).or_default().push(action_idx);
            }
        }
        for axiom in &task.axioms {
            index.intern(axiom.outcome());
        }

        index
    }

    fn intern(&mut self, fact: Fact) -> usize {
        if let Some(&id) = self.ids.get(&fact) {
            return id;
        }
        let id = self.facts.len();
        self.facts.push(fact);
        self.ids.insert(fact, id);
        id
    }

    /// Stable id of a fact, if the fact occurs anywhere in the task.
    pub fn id(&self, fact: &Fact) -> Option<usize> {
        self.ids.get(fact).copied()
    }

    /// The fact with the given id.
    pub fn fact(&self, id: usize) -> Fact {
        self.facts[id]
    }

    /// Number of distinct facts in the task.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Actions with the fact among their preconditions.
    pub fn actions_requiring(&self, fact: &Fact) -> &[usize] {
        self.by_precondition.get(fact).map_or(&[], Vec::as_slice)
    }

    /// Actions with the fact among their effect outcomes.
    pub fn actions_producing(&self, fact: &Fact) -> &[usize] {
        self.by_effect.get(fact).map_or(&[], Vec::as_slice)
    }

    /// Actions with zero preconditions (always precondition-satisfied).
    pub fn unconditional_actions(&self) -> &[usize] {
        &self.no_precondition
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use crate::domain::{Action, CostMetric, Effect, State, Variable};

    use super::*;

    fn variable(name: &str, range: usize) -> Variable {
        Variable {
            name: name.into(),
            axiom_layer: -1,
            range,
            value_names: (0..range).map(|v| format!("{name}{v}")).collect(),
        }
    }

    fn sample_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::Unit,
            variables: vec![variable("a", 2), variable("b", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(1, 1)],
            actions: vec![
                Action {
                    name: "set-b".into(),
                    preconditions: smallvec![Fact::new(0, 1)],
                    effects: vec![Effect {
                        conditions: smallvec![],
                        var: 1,
                        before: -1,
                        after: 1,
                    }],
                    cost: 1,
                },
                Action {
                    name: "set-a".into(),
                    preconditions: smallvec![],
                    effects: vec![Effect {
                        conditions: smallvec![],
                        var: 0,
                        before: 0,
                        after: 1,
                    }],
                    cost: 1,
                },
            ],
            axioms: vec![],
        }
    }

    #[test]
    fn every_referenced_fact_is_interned_once() {
        let task = sample_task();
        let index = FactIndex::build(&task);
        // (0,0) (1,0) from the initial state, (1,1) goal+effect, (0,1) precond+effect.
        assert_eq!(index.len(), 4);
        for id in 0..index.len() {
            let fact = index.fact(id);
            assert_eq!(index.id(&fact), Some(id));
        }
    }

    #[test]
    fn reverse_maps_point_at_the_right_actions() {
        let task = sample_task();
        let index = FactIndex::build(&task);
        assert_eq!(index.actions_requiring(&Fact::new(0, 1)), &[0]);
        assert_eq!(index.actions_producing(&Fact::new(1, 1)), &[0]);
        assert_eq!(index.actions_producing(&Fact::new(0, 1)), &[1]);
        assert_eq!(index.unconditional_actions(), &[1]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let task = sample_task();
        let a = FactIndex::build(&task);
        let b = FactIndex::build(&task);
        assert_eq!(a.len(), b.len());
        for id in 0..a.len() {
            assert_eq!(b.id(&a.fact(id)), Some(id));
        }
    }
}
