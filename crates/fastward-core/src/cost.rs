//! Saturating cost arithmetic.
//!
//! Heuristic estimates routinely add "unreachable" to finite costs; every
//! addition here saturates to [`INFINITE`] instead of wrapping.

/// A plan or heuristic cost.
pub type Cost = u64;

/// The cost of an unreachable fact or action.
pub const INFINITE: Cost = u64::MAX;

/// Adds two costs, saturating to [`INFINITE`].
#[inline]
pub fn saturating_add(a: Cost, b: Cost) -> Cost {
    a.saturating_add(b)
}

/// Returns true if the cost denotes unreachability.
#[inline]
pub fn is_infinite(cost: Cost) -> bool {
    cost == INFINITE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_saturates_instead_of_wrapping() {
        assert_eq!(saturating_add(INFINITE, 1), INFINITE);
        assert_eq!(saturating_add(INFINITE, INFINITE), INFINITE);
        assert_eq!(saturating_add(3, 4), 7);
    }

    #[test]
    fn infinity_is_recognized() {
        assert!(is_infinite(INFINITE));
        assert!(!is_infinite(0));
        assert!(!is_infinite(INFINITE - 1));
    }
}
