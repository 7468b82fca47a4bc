//! Per-search mutable state and the transition engine.
//!
//! A [`SearchContext`] is owned by exactly one `solve`/`dfs`/refine call.
//! It carries everything a search mutates: the current state, per-action
//! usage flags, per-effect fired flags, heuristic costs, the
//! pending-effects queue and the growing plan. The task and fact index stay immutable; a
//! sub-problem gets a fresh context over its own task copy, never a shared
//! pointer.

use fastward_core::cost::{Cost, INFINITE};
use fastward_core::{FactIndex, PlanningTask, State};

use crate::plan::{Plan, PlanStep};

/// A deferred effect awaiting a later state that satisfies its guards,
/// identified by its action and position within it. Identity (not a
/// copy of the effect) keeps the queue free of duplicates when an
/// action is selected again while still gated, and lets the action be
/// marked used once all of its effects have eventually fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEffect {
    action: usize,
    effect: usize,
}

/// Mutable search state plus the transition operations of the engine.
#[derive(Debug)]
pub struct SearchContext<'a> {
    task: &'a PlanningTask,
    index: &'a FactIndex,
    state: State,
    used: Vec<bool>,
    fired: Vec<Vec<bool>>,
    h_cost: Vec<Cost>,
    pending: Vec<PendingEffect>,
    plan: Plan,
}

impl<'a> SearchContext<'a> {
    /// A fresh context positioned at the task's initial state, with every
    /// action unused and every heuristic cost unreachable.
    pub fn new(task: &'a PlanningTask, index: &'a FactIndex) -> Self {
        let n = task.actions.len();
        Self {
            task,
            index,
            state: task.initial_state.clone(),
            used: vec![false; n],
            fired: task
                .actions
                .iter()
                .map(|action| vec![false; action.effects.len()])
                .collect(),
            h_cost: vec![INFINITE; n],
            pending: Vec::new(),
            plan: Plan::new(),
        }
    }

    pub fn task(&self) -> &'a PlanningTask {
        self.task
    }

    pub fn index(&self) -> &'a FactIndex {
        self.index
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }

    pub fn is_used(&self, action: usize) -> bool {
        self.used[action]
    }

    pub fn h_cost(&self, action: usize) -> Cost {
        self.h_cost[action]
    }

    pub fn set_h_cost(&mut self, action: usize, cost: Cost) {
        self.h_cost[action] = cost;
    }

    /// Resets every action's heuristic cost to unreachable. Called before
    /// each heuristic recomputation so no estimate from an earlier state
    /// leaks into the current one.
    pub fn reset_heuristic_costs(&mut self) {
        self.h_cost.fill(INFINITE);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if every goal fact holds in the current state.
    pub fn goal_reached(&self) -> bool {
        self.task.goal_reached(&self.state)
    }

    /// Indices of actions whose preconditions all hold in the current
    /// state, skipping consumed actions when `exclude_used` is set.
    pub fn applicable_actions(&self, exclude_used: bool) -> Vec<usize> {
        self.task
            .actions
            .iter()
            .enumerate()
            .filter(|(idx, action)| {
                !(exclude_used && self.used[*idx]) && action.applicable_in(&self.state)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Applies axioms layer by layer, low to high, one pass per layer.
    ///
    /// Within a layer the traversal order is the fixed declaration order;
    /// the outer layer loop is what lets later layers observe earlier
    /// layers' writes. Every write passes the prior-value and mutex
    /// guards.
    pub fn apply_axioms(&mut self) {
        let task = self.task;
        let max_layer = task.max_axiom_layer();
        for layer in 0..=max_layer {
            for axiom in &task.axioms {
                if task.variables[axiom.var].axiom_layer != layer {
                    continue;
                }
                if axiom.conditions_hold(&self.state)
                    && axiom.before_matches(&self.state)
                    && task.mutex_allows(axiom.var, axiom.after, &self.state)
                {
                    self.state.assign(axiom.var, axiom.after);
                }
            }
        }
    }

    /// Applies an action's effects to the current state, deferring any
    /// effect whose guards are unmet, and returns how many effects fired.
    ///
    /// Each effect fires at most once per action, so re-selecting a
    /// partially fired action neither re-fires nor re-queues anything.
    /// The action is appended to the plan (and charged) exactly once, on
    /// its first firing, whether that happens here or from the pending
    /// queue. It becomes permanently used only when every one of its
    /// effects has fired.
    pub fn apply_action(&mut self, idx: usize) -> usize {
        let task = self.task;
        let action = &task.actions[idx];
        let first = !self.has_fired_any(idx);
        let mut fired = 0;
        for (k, effect) in action.effects.iter().enumerate() {
            if self.fired[idx][k] {
                continue;
            }
            if !effect.conditions_hold(&self.state) {
                self.defer(idx, k);
                continue;
            }
            if effect.before_matches(&self.state)
                && task.mutex_allows(effect.var, effect.after, &self.state)
            {
                self.state.assign(effect.var, effect.after);
                self.fired[idx][k] = true;
                fired += 1;
            } else {
                self.defer(idx, k);
            }
        }

        if fired > 0 && first {
            self.charge(idx);
        }
        if self.all_fired(idx) {
            self.used[idx] = true;
        }
        fired
    }

    /// Retries every deferred effect against the current state under the
    /// same guard logic as [`apply_action`](Self::apply_action), removing
    /// the ones that fire. An action whose first firing happens here is
    /// appended and charged exactly as in `apply_action`. Returns the
    /// number applied.
    ///
    /// Iterates from the end of the queue so removal keeps the remaining
    /// indices valid. Effects whose prior-value guard is structurally
    /// unsatisfiable simply stay queued; the no-applicable-actions check
    /// in the driver still terminates the search.
    pub fn apply_pending_effects(&mut self) -> usize {
        let task = self.task;
        let mut applied = 0;
        let mut i = self.pending.len();
        while i > 0 {
            i -= 1;
            let PendingEffect { action, effect } = self.pending[i];
            if self.fired[action][effect] {
                self.pending.swap_remove(i);
                continue;
            }
            let eff = &task.actions[action].effects[effect];
            if !(eff.conditions_hold(&self.state)
                && eff.before_matches(&self.state)
                && task.mutex_allows(eff.var, eff.after, &self.state))
            {
                continue;
            }
            self.pending.swap_remove(i);
            if !self.has_fired_any(action) {
                self.charge(action);
            }
            self.state.assign(eff.var, eff.after);
            self.fired[action][effect] = true;
            if self.all_fired(action) {
                self.used[action] = true;
            }
            applied += 1;
        }
        applied
    }

    fn has_fired_any(&self, idx: usize) -> bool {
        self.fired[idx].iter().any(|&f| f)
    }

    fn all_fired(&self, idx: usize) -> bool {
        self.fired[idx].iter().all(|&f| f)
    }

    /// Queues a deferred effect unless an identical entry is queued.
    fn defer(&mut self, action: usize, effect: usize) {
        let entry = PendingEffect { action, effect };
        if !self.pending.contains(&entry) {
            self.pending.push(entry);
        }
    }

    /// Appends the action to the plan with its metric cost. Called once
    /// per action, on its first fired effect.
    fn charge(&mut self, idx: usize) {
        let task = self.task;
        self.plan.push(PlanStep {
            action: idx,
            name: task.actions[idx].name.clone(),
            cost: task.actions[idx].metric_cost(task.metric),
        });
    }

    /// Drops from `candidates` every action whose effects all already
    /// hold in the current state, marking it used: applying it would be a
    /// no-op and it must not reach the ranking step.
    pub fn remove_satisfied_actions(&mut self, candidates: &mut Vec<usize>) {
        let task = self.task;
        let state = &self.state;
        let used = &mut self.used;
        candidates.retain(|&idx| {
            let satisfied = task.actions[idx]
                .effects
                .iter()
                .all(|effect| effect.already_applied(state));
            if satisfied {
                used[idx] = true;
            }
            !satisfied
        });
    }
}

/// Applies an action's effects on a scratch copy of `state` with no
/// deferral: effects whose guards are unmet are skipped. Shared by the
/// lookahead, the DFS refiner, the plan replay and the verifier.
pub fn project(task: &PlanningTask, idx: usize, state: &State) -> State {
    let mut next = state.clone();
    for effect in &task.actions[idx].effects {
        if effect.conditions_hold(&next)
            && effect.before_matches(&next)
            && task.mutex_allows(effect.var, effect.after, &next)
        {
            next.assign(effect.var, effect.after);
        }
    }
    next
}
