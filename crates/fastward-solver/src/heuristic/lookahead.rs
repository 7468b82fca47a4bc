//! Two-ply lookahead re-ranking.
//!
//! After the base heuristic has priced the applicable actions, each
//! candidate is simulated one step ahead on a scratch state (ignoring
//! pending-effect deferral) and the heuristic value of the resulting
//! state is added to its existing cost. Overflow saturates to
//! unreachable.

use fastward_core::cost::{saturating_add, Cost};

use crate::context::{project, SearchContext};
use crate::heuristic::{self, HeuristicMode};

/// Re-ranks `candidates` in place: each candidate's heuristic cost
/// becomes `base cost + estimate(resulting state)`.
///
/// The simulation re-prices actions through the context, so the base
/// costs are captured first and the combined costs written back at the
/// end.
pub fn rerank(ctx: &mut SearchContext<'_>, candidates: &[usize]) {
    let base: Vec<Cost> = candidates.iter().map(|&idx| ctx.h_cost(idx)).collect();
    let mut combined = base.clone();

    for (k, &idx) in candidates.iter().enumerate() {
        let next = project(ctx.task(), idx, ctx.state());
        ctx.reset_heuristic_costs();
        let after = heuristic::estimate(ctx, &next, HeuristicMode::HMax);
        combined[k] = saturating_add(base[k], after);
    }

    for (k, &idx) in candidates.iter().enumerate() {
        ctx.set_h_cost(idx, combined[k]);
    }
}
