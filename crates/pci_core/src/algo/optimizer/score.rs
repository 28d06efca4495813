use std::fmt;

use crate::conflict::{Conflict, ConflictKind, Severity};

/// Lexicographic quality of an assignment; smaller is better.
///
/// `modulus_penalty` sums [`ConflictKind::modulus_penalty`] over the non-critical
/// conflicts, so trading a mod-3 collision for a milder one counts as progress even
/// when the conflict total does not change.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Score {
    pub critical: usize,
    pub high: usize,
    pub modulus_penalty: u64,
    pub total: usize,
}

impl Score {
    pub fn of(conflicts: &[Conflict]) -> Self {
        let mut score = Self {
            total: conflicts.len(),
            ..Self::default()
        };
        for conflict in conflicts {
            match conflict.severity {
                Severity::Critical => score.critical += 1,
                Severity::High => score.high += 1,
                Severity::Medium | Severity::Low => {}
            }
            if conflict.severity != Severity::Critical {
                score.modulus_penalty += conflict.kind.modulus_penalty();
            }
        }
        score
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "critical={} high={} penalty={} total={}",
            self.critical, self.high, self.modulus_penalty, self.total
        )
    }
}

/// Every remaining conflict is low severity, except mod-30 collisions which may be medium.
pub(crate) fn only_low_significance(conflicts: &[Conflict]) -> bool {
    !conflicts.is_empty()
        && conflicts.iter().all(|conflict| match conflict.severity {
            Severity::Low => true,
            Severity::Medium => conflict.kind == ConflictKind::Modulus30,
            Severity::High | Severity::Critical => false,
        })
}

#[cfg(test)]
mod tests {
    use super::{Score, only_low_significance};
    use crate::conflict::{Conflict, ConflictKind, Severity};

    fn conflict(kind: ConflictKind, severity: Severity) -> Conflict {
        Conflict {
            cell_a: 0,
            cell_b: 1,
            kind,
            severity,
            distance_m: 100.0,
            frequency_overlap: true,
            channel_separation_mhz: 0.0,
        }
    }

    #[test]
    fn critical_count_dominates() {
        let one_critical = Score::of(&[conflict(ConflictKind::Modulus30, Severity::Critical)]);
        let many_high = Score::of(&[
            conflict(ConflictKind::Modulus3, Severity::High),
            conflict(ConflictKind::Modulus3, Severity::High),
            conflict(ConflictKind::Modulus3, Severity::High),
        ]);
        assert!(many_high < one_critical);
    }

    #[test]
    fn weaker_modulus_beats_stronger_at_equal_totals() {
        let mod3 = Score::of(&[conflict(ConflictKind::Modulus3, Severity::Medium)]);
        let mod30 = Score::of(&[conflict(ConflictKind::Modulus30, Severity::Medium)]);
        assert_eq!(mod3.total, mod30.total);
        assert!(mod30 < mod3);
        assert!(Score::of(&[]) < mod30);
        assert_eq!(Score::of(&[]), Score::default());
    }

    #[test]
    fn critical_conflicts_carry_no_penalty() {
        let score = Score::of(&[
            conflict(ConflictKind::ExactCollision, Severity::Critical),
            conflict(ConflictKind::Modulus6, Severity::Low),
        ]);
        assert_eq!(score.critical, 1);
        assert_eq!(score.modulus_penalty, 10);
        assert_eq!(score.to_string(), "critical=1 high=0 penalty=10 total=2");
    }

    #[test]
    fn low_significance_allows_low_records_and_medium_mod30() {
        assert!(!only_low_significance(&[]));
        assert!(only_low_significance(&[
            conflict(ConflictKind::Modulus3, Severity::Low),
            conflict(ConflictKind::Modulus6, Severity::Low),
            conflict(ConflictKind::Modulus30, Severity::Medium),
        ]));
        assert!(only_low_significance(&[conflict(ConflictKind::Modulus12, Severity::Low)]));
        assert!(!only_low_significance(&[
            conflict(ConflictKind::Modulus3, Severity::Medium),
            conflict(ConflictKind::Modulus30, Severity::Low),
        ]));
        assert!(!only_low_significance(&[conflict(ConflictKind::Modulus30, Severity::High)]));
    }
}
