//! Dense planning states.

use std::ops::Index;

use super::fact::Fact;

/// A complete assignment of values to variables.
///
/// Structural equality and hashing let states key visited sets directly,
/// with no intermediate encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State(Vec<i32>);

impl State {
    pub fn new(values: Vec<i32>) -> Self {
        Self(values)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the fact holds in this state (wildcard-aware).
    #[inline]
    pub fn holds(&self, fact: &Fact) -> bool {
        fact.matches(self.0[fact.var])
    }

    /// Current value of a variable.
    #[inline]
    pub fn value(&self, var: usize) -> i32 {
        self.0[var]
    }

    /// Writes a value. Guard checks are the caller's responsibility; the
    /// transition engine never calls this without passing the mutex and
    /// prior-value guards first.
    #[inline]
    pub fn assign(&mut self, var: usize, value: i32) {
        self.0[var] = value;
    }

    pub fn values(&self) -> &[i32] {
        &self.0
    }
}

impl Index<usize> for State {
    type Output = i32;

    fn index(&self, var: usize) -> &i32 {
        &self.0[var]
    }
}

impl From<Vec<i32>> for State {
    fn from(values: Vec<i32>) -> Self {
        Self(values)
    }
}
