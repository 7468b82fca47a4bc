//! Recursive max-cost relaxation (h_max).
//!
//! `cost(fact)` is 0 if the fact already holds or is on the current
//! recursion path (cycles break conservatively to 0); otherwise it is the
//! minimum over all unconsumed producing actions of
//! `action cost + max(cost of the action's preconditions)`, or
//! unreachable if no producer exists. The cache and visited set are owned
//! by one estimator call and never reused across calls: action usage
//! changes between calls.

use std::collections::{HashMap, HashSet};

use fastward_core::cost::{saturating_add, Cost, INFINITE};
use fastward_core::{Fact, State};

use crate::context::SearchContext;

/// Estimates the distance from `state` to the goal: the max of
/// `cost(goal_fact)` over all goal facts. Max, not sum, keeps the
/// estimate admissible for the relaxed encoding. Prices producing
/// actions in the context as a side effect.
pub fn estimate(ctx: &mut SearchContext<'_>, state: &State) -> Cost {
    let mut cache = HashMap::new();
    let goal = ctx.task().goal.clone();
    let mut total = 0;
    for fact in goal {
        let mut visited = HashSet::new();
        total = total.max(fact_cost(ctx, state, fact, &mut visited, &mut cache));
    }
    total
}

fn fact_cost(
    ctx: &mut SearchContext<'_>,
    state: &State,
    fact: Fact,
    visited: &mut HashSet<usize>,
    cache: &mut HashMap<usize, Cost>,
) -> Cost {
    let Some(fact_id) = ctx.index().id(&fact) else {
        return INFINITE;
    };
    if let Some(&cost) = cache.get(&fact_id) {
        return cost;
    }
    if state.holds(&fact) || visited.contains(&fact_id) {
        return 0;
    }
    visited.insert(fact_id);

    let producers = ctx.index().actions_producing(&fact);
    if producers.is_empty() {
        return INFINITE;
    }

    let task = ctx.task();
    let mut min_cost = INFINITE;
    for &idx in producers {
        if ctx.is_used(idx) {
            continue;
        }
        let mut max_pre = 0;
        for &pre in &task.actions[idx].preconditions {
            max_pre = max_pre.max(fact_cost(ctx, state, pre, visited, cache));
        }
        let cost = saturating_add(task.actions[idx].metric_cost(task.metric), max_pre);
        ctx.set_h_cost(idx, cost);
        min_cost = min_cost.min(cost);
    }

    cache.insert(fact_id, min_cost);
    min_cost
}
