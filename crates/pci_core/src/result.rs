use std::fmt;

use crate::{Cell, Score, conflict::ConflictStats};

/// Why the optimizer stopped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Termination {
    /// No conflicts remain.
    Converged,
    /// Only mild mod-30 conflicts remain.
    OnlyLowSignificance,
    ShakeupsExhausted,
    IterationCap,
    TimeLimit,
    /// The caller's stop flag was raised.
    Interrupted,
}

impl Termination {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Converged | Self::OnlyLowSignificance)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Converged => "converged",
            Self::OnlyLowSignificance => "only-low-significance",
            Self::ShakeupsExhausted => "shakeups-exhausted",
            Self::IterationCap => "iteration-cap",
            Self::TimeLimit => "time-limit",
            Self::Interrupted => "interrupted",
        })
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PciChange {
    pub cell_id: String,
    pub old_pci: u16,
    pub new_pci: u16,
    pub reason: String,
}

impl fmt::Display for PciChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({})",
            self.cell_id, self.old_pci, self.new_pci, self.reason
        )
    }
}

/// State of the working copy after one iteration. Iteration 0 is the input.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub stats: ConflictStats,
    pub score: Score,
    pub best_score: Score,
    pub accepted: bool,
    pub changes: usize,
    pub shakeup: bool,
    /// Non-improving iterations in a row, before any shakeup reset.
    pub stagnation: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    pub original_assignment: Vec<Cell>,
    pub final_assignment: Vec<Cell>,
    pub iterations: usize,
    pub original_conflict_count: usize,
    pub final_conflict_count: usize,
    pub final_score: Score,
    /// Replaying these changes on `original_assignment` yields `final_assignment`.
    pub change_log: Vec<PciChange>,
    pub convergence_history: Vec<IterationRecord>,
    pub termination: Termination,
    pub shakeups: usize,
}

impl OptimizationResult {
    pub fn resolved_conflicts(&self) -> usize {
        self.original_conflict_count
            .saturating_sub(self.final_conflict_count)
    }

    pub fn conflict_reduction_percent(&self) -> f64 {
        if self.original_conflict_count == 0 {
            return 0.0;
        }
        self.resolved_conflicts() as f64 * 100.0 / self.original_conflict_count as f64
    }

    /// Cells whose PCI differs between the original and final assignment.
    pub fn changed_cells(&self) -> impl Iterator<Item = (&Cell, &Cell)> {
        self.original_assignment
            .iter()
            .zip(&self.final_assignment)
            .filter(|(before, after)| before.pci != after.pci)
    }
}

#[cfg(test)]
mod tests {
    use super::{OptimizationResult, PciChange, Termination};
    use crate::{Cell, Score};

    fn result(original: usize, remaining: usize) -> OptimizationResult {
        let before = vec![
            Cell::new("a", "s1", 1, 40, 0.0, 0.0),
            Cell::new("b", "s1", 2, 40, 0.0, 0.0),
        ];
        let mut after = before.clone();
        after[1].pci = 44;
        OptimizationResult {
            original_assignment: before,
            final_assignment: after,
            iterations: 1,
            original_conflict_count: original,
            final_conflict_count: remaining,
            final_score: Score::default(),
            change_log: Vec::new(),
            convergence_history: Vec::new(),
            termination: Termination::Converged,
            shakeups: 0,
        }
    }

    #[test]
    fn reduction_percent_handles_empty_input() {
        assert_eq!(result(0, 0).conflict_reduction_percent(), 0.0);
        assert_eq!(result(4, 1).resolved_conflicts(), 3);
        assert_eq!(result(4, 1).conflict_reduction_percent(), 75.0);
    }

    #[test]
    fn changed_cells_lists_only_reassigned() {
        let result = result(1, 0);
        let changed: Vec<&str> = result
            .changed_cells()
            .map(|(_, after)| after.id.as_str())
            .collect();
        assert_eq!(changed, vec!["b"]);
    }

    #[test]
    fn change_and_termination_display() {
        let change = PciChange {
            cell_id: String::from("b"),
            old_pci: 40,
            new_pci: 44,
            reason: String::from("shakeup"),
        };
        assert_eq!(change.to_string(), "b: 40 -> 44 (shakeup)");
        assert_eq!(Termination::ShakeupsExhausted.to_string(), "shakeups-exhausted");
        assert!(Termination::OnlyLowSignificance.is_success());
        assert!(!Termination::IterationCap.is_success());
    }
}
