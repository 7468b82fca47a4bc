//! Bounded depth-first branch-and-bound.
//!
//! Explicit-state search for a minimum-cost action sequence within a
//! fixed number of steps, used to re-optimize a plan segment. Duplicate
//! states are pruned on first visit at any depth; that trades
//! completeness for termination, since a cheaper path reaching the same
//! state later is discarded. This is a deliberate policy carried over
//! from the original search, not an oversight.

use std::collections::HashSet;

use fastward_core::cost::{saturating_add, Cost};
use fastward_core::{PlanningTask, State};

use crate::context::project;
use crate::plan::{Plan, PlanStep};
use crate::termination::CancellationToken;

#[derive(Debug)]
struct DfsNode {
    state: State,
    path: Vec<usize>,
    cost: Cost,
}

/// Searches for the cheapest plan of at most `max_depth` actions, or
/// `None` if no goal state is reachable within the bound.
pub fn bounded_dfs(
    task: &PlanningTask,
    max_depth: usize,
    token: &CancellationToken,
) -> Option<Plan> {
    let mut visited: HashSet<State> = HashSet::new();
    let mut best: Option<(Vec<usize>, Cost)> = None;

    // Seed with every action applicable in the initial state.
    let mut stack: Vec<DfsNode> = applicable(task, &task.initial_state)
        .map(|idx| DfsNode {
            state: project(task, idx, &task.initial_state),
            path: vec![idx],
            cost: task.actions[idx].metric_cost(task.metric),
        })
        .collect();

    while let Some(node) = stack.pop() {
        if token.is_cancelled() {
            break;
        }
        if node.path.len() > max_depth {
            continue;
        }
        if task.goal_reached(&node.state) {
            // Keep the cheaper plan; never expand past a goal.
            let better = best
                .as_ref()
                .map_or(true, |(_, best_cost)| node.cost < *best_cost);
            if better {
                tracing::debug!(cost = node.cost, depth = node.path.len(), "new best plan");
                best = Some((node.path, node.cost));
            }
            continue;
        }
        if !visited.insert(node.state.clone()) {
            continue;
        }
        for idx in applicable(task, &node.state) {
            let mut path = node.path.clone();
            path.push(idx);
            stack.push(DfsNode {
                state: project(task, idx, &node.state),
                path,
                cost: saturating_add(node.cost, task.actions[idx].metric_cost(task.metric)),
            });
        }
    }

    best.map(|(path, _)| {
        let mut plan = Plan::new();
        for idx in path {
            plan.push(PlanStep {
                action: idx,
                name: task.actions[idx].name.clone(),
                cost: task.actions[idx].metric_cost(task.metric),
            });
        }
        plan
    })
}

fn applicable<'a>(
    task: &'a PlanningTask,
    state: &'a State,
) -> impl Iterator<Item = usize> + 'a {
    task.actions
        .iter()
        .enumerate()
        .filter(|(_, action)| action.applicable_in(state))
        .map(|(idx, _)| idx)
}
