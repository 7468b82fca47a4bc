//! Heuristic estimators ranking applicable actions.
//!
//! Two families, selected by [`HeuristicMode`]:
//! - the memoized recursive max-cost relaxation ([`hmax`])
//! - backward, priority-queue-driven cost propagation from the goal
//!   ([`backward`]) with min/max/sum aggregation
//!
//! plus the two-ply [`lookahead`] re-ranking. All estimators work on the
//! current state, assume the caller has reset the per-action heuristic
//! costs, and saturate every cost sum to "unreachable" rather than
//! wrapping.

pub mod backward;
pub mod hmax;
pub mod lookahead;

use serde::{Deserialize, Serialize};

use fastward_core::cost::Cost;
use fastward_core::State;

use crate::context::SearchContext;

pub use backward::Aggregate;

/// The closed set of action-ranking strategies.
///
/// The numeric mode codes of older command-line interfaces are a
/// historical artifact; this enumeration is the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicMode {
    /// Uniform choice among all applicable actions.
    Random,
    /// Rank by declared action cost (unit cost degenerates to random).
    #[default]
    Greedy,
    /// Recursive max-cost relaxation, recomputed every iteration.
    HMax,
    /// Recursive max-cost plus one-step simulation of each candidate.
    HMaxLookahead,
    /// Backward cost propagation, min aggregation.
    BackwardMin,
    /// Backward cost propagation, max aggregation.
    BackwardMax,
    /// Backward cost propagation, sum aggregation.
    BackwardSum,
}

impl HeuristicMode {
    /// Modes whose action costs depend on the current state and must be
    /// reset and recomputed at every driver iteration.
    pub fn recomputes_each_iteration(self) -> bool {
        matches!(
            self,
            HeuristicMode::HMax
                | HeuristicMode::HMaxLookahead
                | HeuristicMode::BackwardMin
                | HeuristicMode::BackwardMax
                | HeuristicMode::BackwardSum
        )
    }

    /// Modes that re-rank candidates by simulating each one step ahead.
    pub fn uses_lookahead(self) -> bool {
        matches!(self, HeuristicMode::HMaxLookahead)
    }
}

impl std::fmt::Display for HeuristicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HeuristicMode::Random => "random",
            HeuristicMode::Greedy => "greedy",
            HeuristicMode::HMax => "h_max",
            HeuristicMode::HMaxLookahead => "h_max+lookahead",
            HeuristicMode::BackwardMin => "backward(min)",
            HeuristicMode::BackwardMax => "backward(max)",
            HeuristicMode::BackwardSum => "backward(sum)",
        };
        f.write_str(name)
    }
}

/// Computes the state's distance-to-goal estimate under `mode`, pricing
/// the actions in the context as a side effect. `state` is the state to
/// estimate from, which the lookahead may pass in place of the context's
/// own.
pub fn estimate(ctx: &mut SearchContext<'_>, state: &State, mode: HeuristicMode) -> Cost {
    match mode {
        HeuristicMode::Random | HeuristicMode::Greedy => 0,
        HeuristicMode::HMax | HeuristicMode::HMaxLookahead => hmax::estimate(ctx, state),
        HeuristicMode::BackwardMin => backward::estimate(ctx, state, Aggregate::Min),
        HeuristicMode::BackwardMax => backward::estimate(ctx, state, Aggregate::Max),
        HeuristicMode::BackwardSum => backward::estimate(ctx, state, Aggregate::Sum),
    }
}
