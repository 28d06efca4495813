use crate::{Cell, PciDomain, conflict::ConflictKind};

pub const DEFAULT_SUGGESTION_COUNT: usize = 10;

/// Unused in-domain PCIs, ascending, that share no mod 3/6/12/30 residue with any given cell.
///
/// Because mod 6, 12 and 30 all refine mod 3, a candidate qualifies exactly when its
/// mod-3 residue is unused, so dense plans usually return nothing.
pub fn suggest_pci(cells: &[Cell], domain: PciDomain, count: usize) -> Vec<u16> {
    let moduli: Vec<u16> = ConflictKind::MODULI
        .iter()
        .filter_map(|kind| kind.modulus())
        .collect();

    domain
        .iter()
        .filter(|&pci| {
            cells.iter().all(|cell| {
                cell.pci != pci && moduli.iter().all(|&m| pci % m != cell.pci % m)
            })
        })
        .take(count)
        .collect()
}
