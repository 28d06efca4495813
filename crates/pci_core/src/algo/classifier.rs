use std::cmp::Ordering;

use rayon::prelude::*;

use crate::{
    Cell,
    algo::severity::{PairMetrics, classify_severity},
    conflict::{Conflict, ConflictKind},
    geometry,
    rf::{
        channel::{self, ChannelRelation, FrequencyOverlap},
        propagation,
    },
};

/// Knobs of the pairwise classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierTuning {
    /// Allowed deviation from the tower's expected sector spacing, in degrees.
    pub azimuth_tolerance_deg: f64,
    pub adjacent_guard_mhz: f64,
    /// Same-channel, same-PCI pairs closer than this are always critical.
    pub coordination_distance_m: f64,
    /// Skip pairs beyond the frequency-dependent propagation range.
    pub propagation_cutoff: bool,
}

impl Default for ClassifierTuning {
    fn default() -> Self {
        Self {
            azimuth_tolerance_deg: 15.0,
            adjacent_guard_mhz: channel::DEFAULT_ADJACENT_GUARD_MHZ,
            coordination_distance_m: 5_000.0,
            propagation_cutoff: true,
        }
    }
}

/// Mutual visibility between two cells, typically backed by a terrain service.
pub trait LineOfSight: Sync {
    fn visible(&self, a: &Cell, b: &Cell) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(&Cell, &Cell) -> bool + Sync,
{
    fn visible(&self, a: &Cell, b: &Cell) -> bool {
        self(a, b)
    }
}

/// Used when no terrain data is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysVisible;

impl LineOfSight for AlwaysVisible {
    fn visible(&self, _a: &Cell, _b: &Cell) -> bool {
        true
    }
}

/// All pairwise conflicts with default tuning and no terrain data.
pub fn detect_conflicts(cells: &[Cell]) -> Vec<Conflict> {
    detect_conflicts_with(cells, &ClassifierTuning::default(), &AlwaysVisible)
}

/// Rows of the pair matrix are split across the rayon pool; the final sort makes the
/// output independent of scheduling.
pub fn detect_conflicts_with(
    cells: &[Cell],
    tuning: &ClassifierTuning,
    los: &dyn LineOfSight,
) -> Vec<Conflict> {
    let mut conflicts: Vec<Conflict> = (0..cells.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            ((i + 1)..cells.len()).flat_map(move |j| classify_pair(cells, i, j, tuning, los))
        })
        .collect();

    conflicts.sort_by(compare_conflicts);
    log::debug!(
        "classifier: done cells={} conflicts={}",
        cells.len(),
        conflicts.len()
    );
    conflicts
}

/// Severity descending, then distance ascending; pair and kind make the order total.
pub(crate) fn compare_conflicts(a: &Conflict, b: &Conflict) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.distance_m.total_cmp(&b.distance_m))
        .then_with(|| a.cell_a.cmp(&b.cell_a))
        .then_with(|| a.cell_b.cmp(&b.cell_b))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Whether two sectors of one site point where the tower layout says they should.
pub(crate) fn correctly_separated(a: &Cell, b: &Cell, tolerance_deg: f64) -> bool {
    if !a.is_co_located(b) || a.sector_index == b.sector_index {
        return false;
    }
    let expected = geometry::expected_azimuth_separation(a.tower_configuration);
    (geometry::azimuth_separation(a, b) - expected).abs() < tolerance_deg
}

/// Conflict kinds for one pair, before severity.
pub(crate) fn conflict_kinds(
    pci_a: u16,
    pci_b: u16,
    overlap: &FrequencyOverlap,
    skip_modulus: bool,
) -> Vec<ConflictKind> {
    if pci_a == pci_b && overlap.overlaps() {
        let kind = if overlap.same_center() {
            ConflictKind::ExactCollision
        } else {
            ConflictKind::CoChannelFrequency
        };
        return vec![kind];
    }
    if skip_modulus {
        return Vec::new();
    }

    let mut kinds = Vec::new();
    if overlap.relation == ChannelRelation::Adjacent && (pci_a % 6 == pci_b % 6 || pci_a % 3 == pci_b % 3)
    {
        kinds.push(ConflictKind::AdjacentChannel);
    }

    // Every matching modulus is its own record; a mod-30 match also reports mod 3 and 6.
    kinds.extend(
        ConflictKind::MODULI
            .into_iter()
            .filter(|kind| kind.modulus().is_some_and(|m| pci_a % m == pci_b % m)),
    );
    kinds
}

pub(crate) fn classify_pair(
    cells: &[Cell],
    i: usize,
    j: usize,
    tuning: &ClassifierTuning,
    los: &dyn LineOfSight,
) -> Vec<Conflict> {
    let (a, b) = (&cells[i], &cells[j]);
    let distance_m = geometry::distance_meters(a, b);
    if tuning.propagation_cutoff && !propagation::can_interfere(a, b, distance_m) {
        return Vec::new();
    }

    let overlap = channel::frequency_overlap(a, b, tuning.adjacent_guard_mhz);
    let skip_modulus = correctly_separated(a, b, tuning.azimuth_tolerance_deg);
    let kinds = conflict_kinds(a.pci, b.pci, &overlap, skip_modulus);
    if kinds.is_empty() {
        return Vec::new();
    }

    let metrics = PairMetrics {
        distance_m,
        power_difference_db: a.reference_signal_power_dbm - b.reference_signal_power_dbm,
        frequency_overlap: overlap.overlaps(),
        sector_overlap: if a.is_co_located(b) {
            geometry::sector_overlap_fraction(a, b)
        } else {
            0.0
        },
    };
    let visible = los.visible(a, b);

    kinds
        .into_iter()
        .map(|kind| {
            let severity = classify_severity(kind, &metrics, tuning.coordination_distance_m);
            Conflict {
                cell_a: i,
                cell_b: j,
                kind,
                severity: if visible { severity } else { severity.demoted() },
                distance_m,
                frequency_overlap: overlap.overlaps(),
                channel_separation_mhz: overlap.separation_mhz,
            }
        })
        .collect()
}
