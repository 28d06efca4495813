use crate::Cell;

/// Cells may reach somewhat past the nominal range.
const RANGE_BUFFER: f64 = 1.2;

/// Typical maximum cell radius for a carrier frequency.
pub fn max_propagation_distance_m(frequency_mhz: f64) -> f64 {
    match frequency_mhz {
        f if f < 1_000.0 => 30_000.0,
        f if f < 1_500.0 => 15_000.0,
        f if f < 2_200.0 => 10_000.0,
        f if f < 2_700.0 => 5_000.0,
        f if f < 4_000.0 => 3_000.0,
        f if f < 6_000.0 => 2_000.0,
        _ => 500.0,
    }
}

pub fn propagation_range_m(cell: &Cell) -> f64 {
    max_propagation_distance_m(cell.frequency_mhz())
}

/// Pairs beyond the buffered reach of both cells belong to separate networks.
pub fn can_interfere(a: &Cell, b: &Cell, distance_m: f64) -> bool {
    let reach = propagation_range_m(a).max(propagation_range_m(b));
    distance_m <= reach * RANGE_BUFFER
}
