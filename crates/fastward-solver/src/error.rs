//! Error types for the search engine.

use thiserror::Error;

/// Errors surfaced by the solver API.
///
/// Planning failure is not an error: an unsolvable task produces a
/// [`crate::SearchOutcome::NoSolution`] outcome. Guard violations
/// (mutex conflicts, unmet effect conditions, prior-value mismatches)
/// are ordinary control flow inside the engine.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A refinement window that is empty or inverted; rejected before any
    /// solving work begins.
    #[error("degenerate refinement window: start {start} >= end {end}")]
    DegenerateWindow { start: usize, end: usize },

    /// A refinement window extending past the plan.
    #[error("refinement window end {end} exceeds plan length {len}")]
    WindowOutOfBounds { end: usize, len: usize },
}
