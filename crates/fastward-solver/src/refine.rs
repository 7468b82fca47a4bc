//! Plan segmentation and merging.
//!
//! Carves a `[start, end)` window out of an existing plan, re-solves the
//! corresponding sub-problem (new initial state = state after the
//! prefix, new goal = the state diff across the window), and splices the
//! result back in only when it strictly lowers the total cost.

use fastward_core::{Fact, PlanningTask};

use crate::context::project;
use crate::dfs::bounded_dfs;
use crate::error::SolverError;
use crate::plan::Plan;
use crate::search::{SearchOutcome, Solver};
use crate::termination::CancellationToken;

/// How the sub-problem is re-solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineMethod {
    /// Re-run the greedy driver on the sub-problem.
    Search,
    /// Branch-and-bound bounded by the window length.
    BoundedDfs,
}

/// Outcome of a refinement attempt. `plan` is always usable: the merged
/// plan on improvement, the original otherwise (including when the
/// sub-solve was cancelled, which falls back to the already-completed
/// plan).
#[derive(Debug, Clone)]
pub struct RefineReport {
    pub plan: Plan,
    pub improved: bool,
}

/// Attempts to replace `plan[start..end]` with a cheaper sub-plan.
///
/// A degenerate window (`start >= end`) or one extending past the plan
/// is rejected before any solving work begins.
pub fn refine(
    task: &PlanningTask,
    plan: &Plan,
    start: usize,
    end: usize,
    method: RefineMethod,
    solver: &Solver,
    token: &CancellationToken,
) -> Result<RefineReport, SolverError> {
    if start >= end {
        return Err(SolverError::DegenerateWindow { start, end });
    }
    if end > plan.len() {
        return Err(SolverError::WindowOutOfBounds {
            end,
            len: plan.len(),
        });
    }

    // Replay the prefix to the window start, then across the window.
    let mut state = task.initial_state.clone();
    for step in &plan.steps[..start] {
        state = project(task, step.action, &state);
    }
    let sub_initial = state.clone();
    for step in &plan.steps[start..end] {
        state = project(task, step.action, &state);
    }

    // The sub-goal is where the window's end state differs from its start.
    let goal: Vec<Fact> = (0..state.len())
        .filter(|&var| state.value(var) != sub_initial.value(var))
        .map(|var| Fact::new(var, state.value(var)))
        .collect();

    let sub_task = task.with_initial_and_goal(sub_initial, goal);
    tracing::debug!(start, end, sub_goals = sub_task.goal.len(), "solving sub-problem");

    let sub_plan = match method {
        RefineMethod::Search => {
            let report = solver.solve(&sub_task, token);
            match report.outcome {
                SearchOutcome::GoalReached => report.plan,
                SearchOutcome::NoSolution | SearchOutcome::Cancelled => None,
            }
        }
        RefineMethod::BoundedDfs => bounded_dfs(&sub_task, end - start, token),
    };

    let Some(sub_plan) = sub_plan else {
        return Ok(RefineReport {
            plan: plan.clone(),
            improved: false,
        });
    };

    let merged = splice(plan, &sub_plan, start, end);
    if merged.total_cost < plan.total_cost {
        tracing::info!(
            original = plan.total_cost,
            merged = merged.total_cost,
            "improved plan found"
        );
        Ok(RefineReport {
            plan: merged,
            improved: true,
        })
    } else {
        tracing::debug!("no improvement, keeping the original plan");
        Ok(RefineReport {
            plan: plan.clone(),
            improved: false,
        })
    }
}

/// Prefix + sub-plan + suffix, with the total cost recomputed as the
/// sum over the spliced sequence.
fn splice(original: &Plan, sub: &Plan, start: usize, end: usize) -> Plan {
    let mut merged = Plan::new();
    for step in &original.steps[..start] {
        merged.push(step.clone());
    }
    for step in &sub.steps {
        merged.push(step.clone());
    }
    for step in &original.steps[end..] {
        merged.push(step.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use fastward_core::cost::Cost;
    use fastward_core::{Action, CostMetric, Effect, State, Variable, WILDCARD};

    use crate::config::SolverConfig;
    use crate::heuristic::HeuristicMode;

    use super::*;

    fn variable(name: &str, range: usize) -> Variable {
        Variable {
            name: name.into(),
            axiom_layer: -1,
            range,
            value_names: (0..range).map(|v| format!("{name}{v}")).collect(),
        }
    }

    fn action(name: &str, pre: &[(usize, i32)], var: usize, after: i32, cost: Cost) -> Action {
        Action {
            name: name.into(),
            preconditions: pre.iter().map(|&(v, x)| Fact::new(v, x)).collect(),
            effects: vec![Effect {
                conditions: smallvec![],
                var,
                before: WILDCARD,
                after,
            }],
            cost,
        }
    }

    /// loc goes 0 -> 1 -> 2, with a direct 0 -> 2 shortcut the original
    /// plan missed.
    fn detour_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::ActionCost,
            variables: vec![variable("loc", 3), variable("flag", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(0, 2), Fact::new(1, 1)],
            actions: vec![
                action("step-one", &[(0, 0)], 0, 1, 4),
                action("step-two", &[(0, 1)], 0, 2, 4),
                action("shortcut", &[(0, 0)], 0, 2, 3),
                action("raise", &[(0, 2)], 1, 1, 1),
            ],
            axioms: vec![],
        }
    }

    fn detour_plan(task: &PlanningTask) -> Plan {
        let mut plan = Plan::new();
        for idx in [0, 1, 3] {
            plan.push(crate::plan::PlanStep {
                action: idx,
                name: task.actions[idx].name.clone(),
                cost: task.actions[idx].metric_cost(task.metric),
            });
        }
        plan
    }

    fn solver() -> Solver {
        Solver::new(SolverConfig {
            mode: HeuristicMode::BackwardMin,
            ..SolverConfig::default()
        })
    }

    #[test]
    fn degenerate_window_is_rejected_before_solving() {
        let task = detour_task();
        let plan = detour_plan(&task);
        let err = refine(
            &task,
            &plan,
            2,
            2,
            RefineMethod::BoundedDfs,
            &solver(),
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::DegenerateWindow { start: 2, end: 2 }
        ));
    }

    #[test]
    fn dfs_refinement_splices_in_the_shortcut() {
        let task = detour_task();
        let plan = detour_plan(&task);
        assert_eq!(plan.total_cost, 9);
        let report = refine(
            &task,
            &plan,
            0,
            2,
            RefineMethod::BoundedDfs,
            &solver(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(report.improved);
        assert_eq!(report.plan.total_cost, 4); // shortcut + raise
        assert_eq!(report.plan.steps.len(), 2);
        assert_eq!(report.plan.steps[0].name, "shortcut");
        assert_eq!(report.plan.steps[1].name, "raise");
    }

    #[test]
    fn non_improving_subplan_leaves_the_original_untouched() {
        let task = detour_task();
        let plan = detour_plan(&task);
        // The [1, 2) window covers only "step-two"; no cheaper single
        // segment exists from loc=1.
        let report = refine(
            &task,
            &plan,
            1,
            2,
            RefineMethod::BoundedDfs,
            &solver(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(!report.improved);
        assert_eq!(report.plan, plan);
    }

    #[test]
    fn cancelled_subsolve_falls_back_to_the_original_plan() {
        let task = detour_task();
        let plan = detour_plan(&task);
        let token = CancellationToken::new();
        token.cancel();
        let report = refine(
            &task,
            &plan,
            0,
            2,
            RefineMethod::Search,
            &solver(),
            &token,
        )
        .unwrap();
        assert!(!report.improved);
        assert_eq!(report.plan, plan);
    }
}
