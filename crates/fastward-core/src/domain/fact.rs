//! Facts: (variable, value) pairs.

use std::fmt;

/// Sentinel value meaning "any value" in guard positions (effect
/// conditions and prior-value guards). Never valid in goals or mutexes.
pub const WILDCARD: i32 = -1;

/// A (variable, value) pair asserted by a state.
///
/// Equality and hashing are structural, which makes facts usable as
/// map keys in the fact index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fact {
    /// Index of the variable this fact constrains.
    pub var: usize,
    /// Required value of the variable. [`WILDCARD`] only in guards.
    pub value: i32,
}

impl Fact {
    pub fn new(var: usize, value: i32) -> Self {
        Self { var, value }
    }

    /// Returns true if the fact is satisfied, treating [`WILDCARD`] as
    /// matching anything.
    #[inline]
    pub fn matches(&self, actual: i32) -> bool {
        self.value == actual || self.value == WILDCARD
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}={})", self.var, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_any_value() {
        let f = Fact::new(2, WILDCARD);
        assert!(f.matches(0));
        assert!(f.matches(7));
    }

    #[test]
    fn exact_fact_matches_only_its_value() {
        let f = Fact::new(0, 3);
        assert!(f.matches(3));
        assert!(!f.matches(2));
    }
}
