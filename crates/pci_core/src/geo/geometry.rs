//! Great-circle distance and sector beam geometry. Pure functions only.

use crate::{Cell, TowerConfiguration};

const R: f64 = 6_371_000.0;
const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;

/// Haversine distance in meters.
pub fn distance_meters(a: &Cell, b: &Cell) -> f64 {
    haversine(a.latitude, a.longitude, b.latitude, b.longitude)
}

pub(crate) fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    let h = s1 * s1 + phi1.cos() * phi2.cos() * s2 * s2;
    2.0 * R * h.sqrt().min(1.0).asin()
}

/// Smallest angle between two directions, in [0, 180].
pub fn angle_between(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(FULL_TURN);
    if diff > HALF_TURN {
        FULL_TURN - diff
    } else {
        diff
    }
}

/// Separation of the two boresights, wrap-around corrected.
pub fn azimuth_separation(a: &Cell, b: &Cell) -> f64 {
    angle_between(a.azimuth(), b.azimuth())
}

pub fn expected_azimuth_separation(tower: TowerConfiguration) -> f64 {
    tower.expected_azimuth_separation()
}

/// Initial great-circle bearing from `a` towards `b`, in [0, 360).
pub fn bearing_degrees(a: &Cell, b: &Cell) -> f64 {
    let (phi1, phi2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlng = (b.longitude - a.longitude).to_radians();
    let y = dlng.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlng.cos();
    y.atan2(x).to_degrees().rem_euclid(FULL_TURN)
}

/// Fraction of the narrower beam covered by the other beam: 0 = disjoint, 1 = nested.
pub fn sector_overlap_fraction(a: &Cell, b: &Cell) -> f64 {
    let (width_a, width_b) = (a.beamwidth(), b.beamwidth());
    let narrow = width_a.min(width_b);
    if narrow <= 0.0 {
        return 0.0;
    }

    let reach = (width_a + width_b) / 2.0;
    let separation = azimuth_separation(a, b);
    // Arcs can meet on both sides of the circle when the beams are very wide.
    let near_side = (reach - separation).max(0.0);
    let far_side = (reach - (FULL_TURN - separation)).max(0.0);

    ((near_side + far_side).min(narrow) / narrow).clamp(0.0, 1.0)
}

pub fn sectors_overlap(a: &Cell, b: &Cell) -> bool {
    sector_overlap_fraction(a, b) > 0.0
}

/// How squarely `from`'s beam covers `to`: 1 inside the beam, fading to 0 at the back lobe.
pub fn beam_alignment(from: &Cell, to: &Cell) -> f64 {
    let half_width = from.beamwidth() / 2.0;
    let off_axis = angle_between(from.azimuth(), bearing_degrees(from, to));
    if off_axis <= half_width {
        return 1.0;
    }
    let span = (HALF_TURN - half_width).max(f64::EPSILON);
    (1.0 - (off_axis - half_width) / span).clamp(0.0, 1.0)
}

/// Weight in [0.5, 1] expressing whether either sector points at the other.
///
/// Co-located sectors have no meaningful bearing, so their beam overlap is used instead.
pub fn facing_weight(a: &Cell, b: &Cell) -> f64 {
    let facing = if a.is_co_located(b) || distance_meters(a, b) < 1.0 {
        sector_overlap_fraction(a, b)
    } else {
        beam_alignment(a, b).max(beam_alignment(b, a))
    };
    0.5 + 0.5 * facing
}
