//! Plans: ordered action sequences with accumulated cost.

use std::fmt;

use fastward_core::cost::{saturating_add, Cost};

/// One recorded step of a plan: the action's index in the task plus a
/// snapshot of its name and the cost it contributed under the task's
/// metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub action: usize,
    pub name: String,
    pub cost: Cost,
}

/// An ordered action sequence and its total cost.
///
/// Append-only during search; consumed by printing, merging and
/// integrity checking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub total_cost: Cost,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: PlanStep) {
        self.total_cost = saturating_add(self.total_cost, step.cost);
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}: {}", step.action, step.name)?;
        }
        write!(f, "Cost: {}", self.total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accumulates_cost() {
        let mut plan = Plan::new();
        plan.push(PlanStep {
            action: 3,
            name: "load".into(),
            cost: 2,
        });
        plan.push(PlanStep {
            action: 1,
            name: "drive".into(),
            cost: 5,
        });
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_cost, 7);
    }

    #[test]
    fn display_lists_steps_then_cost() {
        let mut plan = Plan::new();
        plan.push(PlanStep {
            action: 0,
            name: "unstack".into(),
            cost: 1,
        });
        assert_eq!(plan.to_string(), "0: unstack\nCost: 1");
    }
}
