use rand::Rng;

use crate::{
    Cell, PciDomain,
    conflict::Conflict,
    geometry,
    rf::channel::{self, ChannelRelation},
};

/// The `+4` step moves the mod-3 residue while staying close to the old value.
pub(crate) const PREFERRED_STEP: usize = 4;

const EXACT_CO_CHANNEL_PENALTY: f64 = 1_000.0;
const MOD3_CO_CHANNEL_PENALTY: f64 = 100.0;
/// Charged on top of the mod-3 penalty; a shared mod-30 residue always shares mod 3.
const MOD30_CO_CHANNEL_PENALTY: f64 = 25.0;
const MOD3_ADJACENT_PENALTY: f64 = 8.0;
const MOD3_SEPARATED_PENALTY: f64 = 5.0;
const COST_EPSILON: f64 = 1e-9;

/// How many of the current conflicts each cell takes part in.
pub(crate) fn hotspot_counts(cell_count: usize, conflicts: &[Conflict]) -> Vec<usize> {
    let mut counts = vec![0; cell_count];
    for conflict in conflicts {
        counts[conflict.cell_a] += 1;
        counts[conflict.cell_b] += 1;
    }
    counts
}

/// The endpoint of `conflict` to reassign, skipping cells already changed this iteration.
///
/// More conflicts wins, then lower reference-signal power, then `cell_b`.
pub(crate) fn pick_cell(
    conflict: &Conflict,
    counts: &[usize],
    cells: &[Cell],
    touched: &[bool],
) -> Option<usize> {
    let (a, b) = (conflict.cell_a, conflict.cell_b);
    match (touched[a], touched[b]) {
        (true, true) => None,
        (true, false) => Some(b),
        (false, true) => Some(a),
        (false, false) => {
            let prefer_a = counts[a] > counts[b]
                || (counts[a] == counts[b]
                    && cells[a].reference_signal_power_dbm < cells[b].reference_signal_power_dbm);
            Some(if prefer_a { a } else { b })
        }
    }
}

/// Parameters of the per-cell PCI search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CandidateSearch {
    pub(crate) domain: PciDomain,
    pub(crate) radius_m: f64,
    pub(crate) guard_mhz: f64,
    pub(crate) tie_pool: usize,
}

impl CandidateSearch {
    /// Interference cost of giving `cells[idx]` the PCI `pci`, against its neighbours.
    pub(crate) fn cost(
        &self,
        cells: &[Cell],
        idx: usize,
        pci: u16,
        neighbors: &[(usize, f64)],
    ) -> f64 {
        let cell = &cells[idx];
        neighbors
            .iter()
            .map(|&(other_idx, distance_m)| {
                let other = &cells[other_idx];
                let relation = channel::frequency_overlap(cell, other, self.guard_mhz).relation;
                let same_mod3 = pci % 3 == other.pci % 3;

                let penalty = match relation {
                    ChannelRelation::CoChannel if pci == other.pci => EXACT_CO_CHANNEL_PENALTY,
                    ChannelRelation::CoChannel if pci % 30 == other.pci % 30 => {
                        MOD3_CO_CHANNEL_PENALTY + MOD30_CO_CHANNEL_PENALTY
                    }
                    ChannelRelation::CoChannel if same_mod3 => MOD3_CO_CHANNEL_PENALTY,
                    ChannelRelation::Adjacent if same_mod3 => MOD3_ADJACENT_PENALTY,
                    ChannelRelation::Separated if same_mod3 => MOD3_SEPARATED_PENALTY,
                    ChannelRelation::CoChannel
                    | ChannelRelation::Adjacent
                    | ChannelRelation::Separated => 0.0,
                };
                if penalty == 0.0 {
                    return 0.0;
                }

                let proximity =
                    1.0 + ((self.radius_m - distance_m) / self.radius_m).clamp(0.0, 1.0);
                penalty * proximity * geometry::facing_weight(cell, other)
            })
            .sum()
    }

    /// Cheapest PCI for `cells[idx]`, or `None` when the domain offers no alternative.
    ///
    /// Candidates run from `current + 4` upward, wrapping inside the domain. Among the
    /// first `tie_pool` candidates at the minimum cost one is drawn uniformly.
    pub(crate) fn choose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        cells: &[Cell],
        idx: usize,
        neighbors: &[(usize, f64)],
    ) -> Option<u16> {
        let current = cells[idx].pci;
        let scored: Vec<(u16, f64)> = (0..self.domain.len())
            .map(|offset| self.domain.wrapping_offset(current, PREFERRED_STEP + offset))
            .filter(|&pci| pci != current)
            .map(|pci| (pci, self.cost(cells, idx, pci, neighbors)))
            .collect();

        let best = scored
            .iter()
            .map(|&(_, cost)| cost)
            .min_by(f64::total_cmp)?;
        let pool: Vec<u16> = scored
            .iter()
            .filter(|&&(_, cost)| cost - best <= COST_EPSILON)
            .map(|&(pci, _)| pci)
            .take(self.tie_pool.max(1))
            .collect();

        Some(pool[rng.random_range(0..pool.len())])
    }
}
