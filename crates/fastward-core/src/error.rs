//! Error types for the domain model.

use thiserror::Error;

/// Structural problems in a planning task.
///
/// These indicate malformed input, not planning failure: an unsolvable
/// but well-formed task is reported as a search outcome, never as an
/// error.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The initial state vector does not cover every variable.
    #[error("initial state has {actual} values but the task declares {expected} variables")]
    StateWidth { expected: usize, actual: usize },

    /// A fact references a variable the task does not declare.
    #[error("fact references unknown variable {var}")]
    UnknownVariable { var: usize },

    /// A fact's value lies outside its variable's range.
    #[error("value {value} out of range for variable {var} (range {range})")]
    ValueOutOfRange {
        var: usize,
        value: i32,
        range: usize,
    },
}
