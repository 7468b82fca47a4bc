//! Plan integrity verification.
//!
//! Replays a recorded plan from the initial state and confirms that
//! every action was legally applicable in sequence and that the
//! accumulated cost matches the recorded total. A mismatch indicates a
//! bug to investigate, never a condition the planner recovers from;
//! the result is a report, not a panic.

use fastward_core::cost::{saturating_add, Cost};
use fastward_core::PlanningTask;

use crate::context::project;
use crate::plan::Plan;

/// Replays `plan` against `task`. Returns false on the first step whose
/// action is not applicable, or if the independently accumulated cost
/// disagrees with the plan's recorded total.
///
/// Already-used actions are naturally included here: this is a replay,
/// not a fresh search.
pub fn check_integrity(task: &PlanningTask, plan: &Plan) -> bool {
    let mut state = task.initial_state.clone();
    let mut cost: Cost = 0;
    for step in &plan.steps {
        let Some(action) = task.actions.get(step.action) else {
            tracing::warn!(step.action, "plan references an unknown action");
            return false;
        };
        if !action.applicable_in(&state) {
            tracing::warn!(step.action, name = %step.name, "action not applicable at replay");
            return false;
        }
        state = project(task, step.action, &state);
        cost = saturating_add(cost, action.metric_cost(task.metric));
    }
    if cost != plan.total_cost {
        tracing::warn!(
            recorded = plan.total_cost,
            replayed = cost,
            "plan cost mismatch"
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use fastward_core::{Action, CostMetric, Effect, Fact, State, Variable, WILDCARD};

    use crate::plan::PlanStep;

    use super::*;

    fn variable(name: &str, range: usize) -> Variable {
        Variable {
            name: name.into(),
            axiom_layer: -1,
            range,
            value_names: (0..range).map(|v| format!("{name}{v}")).collect(),
        }
    }

    fn chain_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::ActionCost,
            variables: vec![variable("a", 2), variable("b", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(1, 1)],
            actions: vec![
                Action {
                    name: "first".into(),
                    preconditions: smallvec![Fact::new(0, 0)],
                    effects: vec![Effect {
                        conditions: smallvec![],
                        var: 0,
                        before: 0,
                        after: 1,
                    }],
                    cost: 2,
                },
                Action {
                    name: "second".into(),
                    preconditions: smallvec![Fact::new(0, 1)],
                    effects: vec![Effect {
                        conditions: smallvec![],
                        var: 1,
                        before: 0,
                        after: 1,
                    }],
                    cost: 3,
                },
            ],
            axioms: vec![],
        }
    }

    fn step(task: &PlanningTask, idx: usize) -> PlanStep {
        PlanStep {
            action: idx,
            name: task.actions[idx].name.clone(),
            cost: task.actions[idx].metric_cost(task.metric),
        }
    }

    #[test]
    fn valid_replay_passes() {
        let task = chain_task();
        let mut plan = Plan::new();
        plan.push(step(&task, 0));
        plan.push(step(&task, 1));
        assert!(check_integrity(&task, &plan));
    }

    #[test]
    fn out_of_order_replay_fails() {
        let task = chain_task();
        let mut plan = Plan::new();
        plan.push(step(&task, 1)); // "second" before its enabler
        assert!(!check_integrity(&task, &plan));
    }

    #[test]
    fn cost_mismatch_fails() {
        let task = chain_task();
        let mut plan = Plan::new();
        plan.push(step(&task, 0));
        plan.total_cost = 99;
        assert!(!check_integrity(&task, &plan));
    }
}
