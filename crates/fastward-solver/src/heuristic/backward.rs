//! Backward cost propagation from the goal.
//!
//! A min-priority queue seeded with every goal fact at cost 0; popping a
//! fact prices the unconsumed actions producing it, and a priced action
//! propagates its cost down to its preconditions, decrease-keying them in
//! the queue. An order of magnitude cheaper than the recursive relaxation
//! on repeated calls, at the price of being an approximation for the
//! min/sum aggregations.
//!
//! Decrease-key uses lazy deletion: a fact is re-pushed at its lower cost
//! and stale queue entries are skipped on pop.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fastward_core::cost::{saturating_add, Cost, INFINITE};
use fastward_core::{Fact, State};

use crate::context::SearchContext;

/// How an action's cost aggregates over its priced effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Action cost plus the popped fact's cost alone.
    Min,
    /// Action cost plus the max over the popped fact and the action's
    /// other already-priced effects.
    Max,
    /// Action cost plus the sum over all priced effects.
    Sum,
}

/// Runs the propagation, pricing actions in the context, and returns the
/// reporting estimate for `state`: the cheapest priced fact that
/// currently holds (unreachable if none was priced).
///
/// The caller resets the per-action costs beforehand, so the "does this
/// candidate improve on the recorded cost" comparison is against
/// infinity within one call; costs never go stale across states.
pub fn estimate(ctx: &mut SearchContext<'_>, state: &State, aggregate: Aggregate) -> Cost {
    let task = ctx.task();
    let index = ctx.index();

    let mut fact_costs = vec![INFINITE; index.len()];
    let mut queue: BinaryHeap<Reverse<(Cost, usize)>> = BinaryHeap::new();
    for goal in &task.goal {
        if let Some(id) = index.id(goal) {
            fact_costs[id] = 0;
            queue.push(Reverse((0, id)));
        }
    }

    while let Some(Reverse((cost, fact_id))) = queue.pop() {
        if cost > fact_costs[fact_id] {
            continue; // stale entry superseded by a decrease
        }
        let fact = index.fact(fact_id);
        for &idx in index.actions_producing(&fact) {
            if ctx.is_used(idx) {
                continue;
            }
            let action = &task.actions[idx];
            let base = action.metric_cost(task.metric);
            let candidate = match aggregate {
                Aggregate::Min => saturating_add(base, cost),
                Aggregate::Max => {
                    let mut highest = cost;
                    for effect in &action.effects {
                        if let Some(id) = index.id(&effect.outcome()) {
                            if fact_costs[id] != INFINITE {
                                highest = highest.max(fact_costs[id]);
                            }
                        }
                    }
                    saturating_add(base, highest)
                }
                Aggregate::Sum => {
                    let mut sum = 0;
                    for effect in &action.effects {
                        if let Some(id) = index.id(&effect.outcome()) {
                            if fact_costs[id] != INFINITE {
                                sum = saturating_add(sum, fact_costs[id]);
                            }
                        }
                    }
                    saturating_add(base, sum)
                }
            };
            if candidate >= ctx.h_cost(idx) {
                continue;
            }
            ctx.set_h_cost(idx, candidate);
            for &pre in &action.preconditions {
                if let Some(id) = index.id(&pre) {
                    if candidate < fact_costs[id] {
                        fact_costs[id] = candidate;
                        queue.push(Reverse((candidate, id)));
                    }
                }
            }
        }
    }

    let mut reported = INFINITE;
    for (var, &value) in state.values().iter().enumerate() {
        if let Some(id) = index.id(&Fact::new(var, value)) {
            reported = reported.min(fact_costs[id]);
        }
    }
    reported
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use fastward_core::{
        Action, CostMetric, Effect, FactIndex, PlanningTask, Variable, WILDCARD,
    };

    use super::*;

    fn variable(name: &str, range: usize) -> Variable {
        Variable {
            name: name.into(),
            axiom_layer: -1,
            range,
            value_names: (0..range).map(|v| format!("{name}{v}")).collect(),
        }
    }

    fn effect(var: usize, after: i32) -> Effect {
        Effect {
            conditions: smallvec![],
            var,
            before: WILDCARD,
            after,
        }
    }

    fn chain_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::ActionCost,
            variables: vec![variable("a", 2), variable("b", 2), variable("c", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0, 0]),
            goal: vec![Fact::new(2, 1)],
            actions: vec![
                Action {
                    name: "set-a".into(),
                    preconditions: smallvec![],
                    effects: vec![effect(0, 1)],
                    cost: 2,
                },
                Action {
                    name: "set-b".into(),
                    preconditions: smallvec![Fact::new(0, 1)],
                    effects: vec![effect(1, 1)],
                    cost: 3,
                },
                Action {
                    name: "set-c".into(),
                    preconditions: smallvec![Fact::new(1, 1)],
                    effects: vec![effect(2, 1)],
                    cost: 4,
                },
            ],
            axioms: vec![],
        }
    }

    #[test]
    fn min_aggregation_prices_actions_by_distance_from_goal() {
        let task = chain_task();
        let index = FactIndex::build(&task);
        let mut ctx = SearchContext::new(&task, &index);
        let state = task.initial_state.clone();
        estimate(&mut ctx, &state, Aggregate::Min);
        assert_eq!(ctx.h_cost(2), 4); // produces the goal directly
        assert_eq!(ctx.h_cost(1), 7); // 3 + 4
        assert_eq!(ctx.h_cost(0), 9); // 2 + 7
    }

    #[test]
    fn sum_never_estimates_below_max() {
        // One action with two effects, both needed by the goal.
        let task = PlanningTask {
            metric: CostMetric::ActionCost,
            variables: vec![variable("a", 2), variable("b", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(0, 1), Fact::new(1, 1)],
            actions: vec![Action {
                name: "both".into(),
                preconditions: smallvec![],
                effects: vec![effect(0, 1), effect(1, 1)],
                cost: 5,
            }],
            axioms: vec![],
        };
        let index = FactIndex::build(&task);
        let state = task.initial_state.clone();

        let mut ctx = SearchContext::new(&task, &index);
        estimate(&mut ctx, &state, Aggregate::Max);
        let max_cost = ctx.h_cost(0);

        let mut ctx = SearchContext::new(&task, &index);
        estimate(&mut ctx, &state, Aggregate::Sum);
        let sum_cost = ctx.h_cost(0);

        assert!(sum_cost >= max_cost);
    }

    #[test]
    fn used_actions_are_never_priced() {
        let task = chain_task();
        let index = FactIndex::build(&task);
        let mut ctx = SearchContext::new(&task, &index);
        ctx.apply_action(2);
        ctx.reset_heuristic_costs();
        let state = State::new(vec![0, 0, 0]);
        estimate(&mut ctx, &state, Aggregate::Min);
        assert_eq!(ctx.h_cost(2), INFINITE);
    }
}
