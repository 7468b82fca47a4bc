//! The greedy search driver.
//!
//! Each iteration: apply axioms across layers, retry pending effects,
//! (mode-dependent) recompute heuristic costs, collect the applicable
//! unconsumed actions, drop already-satisfied ones, re-rank via lookahead
//! when the mode asks for it, then pick a minimum-cost action (ties
//! broken by the seeded generator) and apply it. An action that fires
//! zero effects is discarded from the candidate set and selection is
//! retried within the same iteration.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand::SeedableRng;

use fastward_core::cost::{Cost, INFINITE};
use fastward_core::{FactIndex, PlanningTask};

use crate::config::SolverConfig;
use crate::context::SearchContext;
use crate::heuristic::{self, lookahead, HeuristicMode};
use crate::plan::Plan;
use crate::termination::CancellationToken;
use crate::verify;

/// Terminal states of one `solve` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The goal test passed; the report carries the plan.
    GoalReached,
    /// No applicable action remained, or every applicable action was
    /// unreachable under the heuristic. Not an error.
    NoSolution,
    /// The cancellation token fired mid-search. The caller must
    /// distinguish "cancelled with a fallback plan" from "cancelled
    /// without one"; a first solve has none.
    Cancelled,
}

/// Result of one `solve` call.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: SearchOutcome,
    /// The plan, present only on [`SearchOutcome::GoalReached`].
    pub plan: Option<Plan>,
    /// Best (lowest) goal-distance estimate observed, for modes that
    /// recompute one.
    pub best_estimate: Option<Cost>,
    /// Integrity verification result, when the config requests it.
    pub verified: Option<bool>,
}

/// The forward-search planner.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs the greedy driver on `task` until the goal is reached, no
    /// progress is possible, or `token` fires.
    pub fn solve(&self, task: &PlanningTask, token: &CancellationToken) -> SolveReport {
        let index = FactIndex::build(task);
        let mut ctx = SearchContext::new(task, &index);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mode = self.config.mode;

        // Greedy prices actions once, up front; under the unit metric it
        // degenerates to random.
        if mode == HeuristicMode::Greedy {
            for idx in 0..task.actions.len() {
                ctx.set_h_cost(idx, task.actions[idx].metric_cost(task.metric));
            }
        }

        let mut best_estimate = INFINITE;
        let outcome = loop {
            if token.is_cancelled() {
                break SearchOutcome::Cancelled;
            }

            ctx.apply_axioms();
            ctx.apply_pending_effects();
            if ctx.goal_reached() {
                break SearchOutcome::GoalReached;
            }

            if mode.recomputes_each_iteration() {
                ctx.reset_heuristic_costs();
                let state = ctx.state().clone();
                let estimate = heuristic::estimate(&mut ctx, &state, mode);
                if estimate < best_estimate {
                    best_estimate = estimate;
                    tracing::debug!(estimate, "new best goal-distance estimate");
                }
            }

            let mut candidates = ctx.applicable_actions(true);
            ctx.remove_satisfied_actions(&mut candidates);
            if candidates.is_empty() {
                break SearchOutcome::NoSolution;
            }

            if mode.uses_lookahead() {
                lookahead::rerank(&mut ctx, &candidates);
            }

            // Selection with retry: an action can be precondition-satisfied
            // yet fire nothing due to effect-condition or value guards; it
            // is then dropped and selection repeats over the remainder.
            let mut progressed = false;
            while !candidates.is_empty() {
                let chosen = match mode {
                    HeuristicMode::Random => candidates[rng.random_range(0..candidates.len())],
                    _ => {
                        let tied = min_cost_actions(&ctx, &candidates);
                        if tied.is_empty() {
                            break; // every candidate is unreachable
                        }
                        tied[rng.random_range(0..tied.len())]
                    }
                };
                if ctx.apply_action(chosen) > 0 {
                    tracing::trace!(action = chosen, "applied");
                    progressed = true;
                    break;
                }
                candidates.retain(|&idx| idx != chosen);
            }
            if !progressed {
                break SearchOutcome::NoSolution;
            }
        };

        self.report(task, ctx, outcome, best_estimate)
    }

    fn report(
        &self,
        task: &PlanningTask,
        ctx: SearchContext<'_>,
        outcome: SearchOutcome,
        best_estimate: Cost,
    ) -> SolveReport {
        let best_estimate = (best_estimate != INFINITE).then_some(best_estimate);
        match outcome {
            SearchOutcome::GoalReached => {
                let plan = ctx.into_plan();
                let verified = self
                    .config
                    .verify
                    .then(|| verify::check_integrity(task, &plan));
                tracing::info!(steps = plan.len(), cost = plan.total_cost, "solution found");
                SolveReport {
                    outcome,
                    plan: Some(plan),
                    best_estimate,
                    verified,
                }
            }
            SearchOutcome::NoSolution | SearchOutcome::Cancelled => SolveReport {
                outcome,
                plan: None,
                best_estimate,
                verified: None,
            },
        }
    }
}

/// The candidates tied for minimum heuristic cost, or empty when even
/// the minimum is unreachable.
fn min_cost_actions(ctx: &SearchContext<'_>, candidates: &[usize]) -> Vec<usize> {
    let mut min_cost = INFINITE;
    let mut tied = Vec::new();
    for &idx in candidates {
        let cost = ctx.h_cost(idx);
        if cost < min_cost {
            min_cost = cost;
            tied.clear();
            tied.push(idx);
        } else if cost == min_cost {
            tied.push(idx);
        }
    }
    if min_cost == INFINITE {
        tied.clear();
    }
    tied
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use fastward_core::{Action, CostMetric, Effect, Fact, State, Variable, WILDCARD};

    use super::*;

    fn variable(name: &str, range: usize) -> Variable {
        Variable {
            name: name.into(),
            axiom_layer: -1,
            range,
            value_names: (0..range).map(|v| format!("{name}{v}")).collect(),
        }
    }

    fn action(name: &str, pre: &[(usize, i32)], var: usize, after: i32) -> Action {
        Action {
            name: name.into(),
            preconditions: pre.iter().map(|&(v, x)| Fact::new(v, x)).collect(),
            effects: vec![Effect {
                conditions: smallvec![],
                var,
                before: WILDCARD,
                after,
            }],
            cost: 1,
        }
    }

    fn solver(mode: HeuristicMode, seed: u64) -> Solver {
        Solver::new(SolverConfig {
            seed,
            mode,
            verify: true,
            ..SolverConfig::default()
        })
    }

    /// Three variables, no axioms or mutexes, one action per variable
    /// writing its goal value; solvable in any order.
    fn three_var_task() -> PlanningTask {
        PlanningTask {
            metric: CostMetric::Unit,
            variables: vec![variable("x", 2), variable("y", 2), variable("z", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0, 0]),
            goal: vec![Fact::new(0, 1), Fact::new(1, 1), Fact::new(2, 1)],
            actions: vec![
                action("set-x", &[(0, 0)], 0, 1),
                action("set-y", &[(1, 0)], 1, 1),
                action("set-z", &[(2, 0)], 2, 1),
            ],
            axioms: vec![],
        }
    }

    #[test]
    fn trivially_satisfied_goal_yields_an_empty_plan() {
        let mut task = three_var_task();
        task.goal = vec![Fact::new(0, 0)];
        let report = solver(HeuristicMode::Greedy, 0).solve(&task, &CancellationToken::new());
        assert_eq!(report.outcome, SearchOutcome::GoalReached);
        assert!(report.plan.unwrap().is_empty());
    }

    #[test]
    fn unreachable_goal_terminates_with_no_solution() {
        // The only producer of the goal requires a fact with no producer.
        let task = PlanningTask {
            metric: CostMetric::Unit,
            variables: vec![variable("a", 2), variable("b", 2)],
            mutexes: vec![],
            initial_state: State::new(vec![0, 0]),
            goal: vec![Fact::new(1, 1)],
            actions: vec![action("blocked", &[(0, 1)], 1, 1)],
            axioms: vec![],
        };
        for mode in [
            HeuristicMode::Greedy,
            HeuristicMode::HMax,
            HeuristicMode::BackwardMin,
        ] {
            let report = solver(mode, 3).solve(&task, &CancellationToken::new());
            assert_eq!(report.outcome, SearchOutcome::NoSolution, "mode {mode}");
            assert!(report.plan.is_none());
        }
    }

    #[test]
    fn greedy_solves_the_three_variable_scenario_for_any_seed() {
        for seed in 0..8 {
            let task = three_var_task();
            let report = solver(HeuristicMode::Greedy, seed).solve(&task, &CancellationToken::new());
            assert_eq!(report.outcome, SearchOutcome::GoalReached);
            let plan = report.plan.unwrap();
            assert_eq!(plan.len(), 3);
            assert_eq!(plan.total_cost, 3);
            assert_eq!(report.verified, Some(true));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_plan() {
        let task = three_var_task();
        let a = solver(HeuristicMode::Random, 11).solve(&task, &CancellationToken::new());
        let b = solver(HeuristicMode::Random, 11).solve(&task, &CancellationToken::new());
        assert_eq!(a.plan, b.plan);
    }

    #[test]
    fn pre_cancelled_token_reports_cancelled_without_a_plan() {
        let task = three_var_task();
        let token = CancellationToken::new();
        token.cancel();
        let report = solver(HeuristicMode::Greedy, 0).solve(&task, &token);
        assert_eq!(report.outcome, SearchOutcome::Cancelled);
        assert!(report.plan.is_none());
    }
}
