use crate::conflict::{ConflictKind, Severity};

/// Interference from a clearly weaker neighbour is tolerated at these power gaps (dB).
const CRITICAL_POWER_GAP_DB: f64 = 6.0;
const HIGH_POWER_GAP_DB: f64 = 9.0;
const MEDIUM_POWER_GAP_DB: f64 = 12.0;
/// Overlapping spectrum halves the effective distance.
const FREQUENCY_OVERLAP_MULTIPLIER: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Thresholds {
    critical_m: f64,
    high_m: f64,
    medium_m: f64,
}

const fn thresholds(kind: ConflictKind) -> Thresholds {
    let (critical_m, high_m, medium_m) = match kind {
        ConflictKind::ExactCollision | ConflictKind::CoChannelFrequency => (1_000.0, 2_000.0, 5_000.0),
        ConflictKind::AdjacentChannel | ConflictKind::Modulus3 => (500.0, 1_000.0, 2_000.0),
        ConflictKind::Modulus6 => (300.0, 700.0, 1_500.0),
        ConflictKind::Modulus12 => (200.0, 500.0, 1_000.0),
        ConflictKind::Modulus30 => (100.0, 300.0, 600.0),
    };
    Thresholds {
        critical_m,
        high_m,
        medium_m,
    }
}

/// Pair measurements the severity model needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PairMetrics {
    pub(crate) distance_m: f64,
    pub(crate) power_difference_db: f64,
    pub(crate) frequency_overlap: bool,
    /// Beam overlap in [0, 1] for co-located sectors, 0 otherwise.
    pub(crate) sector_overlap: f64,
}

pub(crate) fn classify_severity(
    kind: ConflictKind,
    metrics: &PairMetrics,
    coordination_distance_m: f64,
) -> Severity {
    if kind == ConflictKind::ExactCollision && metrics.distance_m <= coordination_distance_m {
        return Severity::Critical;
    }

    let overlap = metrics.sector_overlap.clamp(0.0, 1.0);
    let mut distance = metrics.distance_m * (1.0 - 0.5 * overlap);
    if metrics.frequency_overlap {
        distance *= FREQUENCY_OVERLAP_MULTIPLIER;
    }
    let power_gap = metrics.power_difference_db.abs() * (1.0 - overlap);

    let limits = thresholds(kind);
    if distance < limits.critical_m && power_gap < CRITICAL_POWER_GAP_DB {
        Severity::Critical
    } else if distance < limits.high_m && power_gap < HIGH_POWER_GAP_DB {
        Severity::High
    } else if distance < limits.medium_m && power_gap < MEDIUM_POWER_GAP_DB {
        Severity::Medium
    } else {
        Severity::Low
    }
}
