use kiddo::{KdTree, SquaredEuclidean};
use map_3d::{self, Ellipsoid};

use crate::{Cell, geometry};

// ECEF chords are shorter than arcs and the ellipsoid differs from the Haversine
// sphere by a fraction of a percent, so the tree query is padded and re-filtered.
const QUERY_PAD_FACTOR: f64 = 1.01;
const QUERY_PAD_METERS: f64 = 50.0;

/// Radius queries over cell positions, built once per optimizer run.
pub(crate) struct NeighborIndex {
    tree: KdTree<f64, 3>,
    positions: Vec<[f64; 3]>,
}

impl NeighborIndex {
    pub(crate) fn new(cells: &[Cell]) -> Self {
        let positions: Vec<[f64; 3]> = cells
            .iter()
            .map(|cell| {
                let (x, y, z) = map_3d::geodetic2ecef(
                    cell.latitude.to_radians(),
                    cell.longitude.to_radians(),
                    0.0,
                    Ellipsoid::default(),
                );
                [x, y, z]
            })
            .collect();

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (idx, position) in positions.iter().enumerate() {
            tree.add(position, idx as u64);
        }

        Self { tree, positions }
    }

    /// Every other cell within `radius_m` of `cells[idx]` as `(index, distance_m)`, by index.
    pub(crate) fn within(&self, cells: &[Cell], idx: usize, radius_m: f64) -> Vec<(usize, f64)> {
        let Some(origin) = self.positions.get(idx) else {
            return Vec::new();
        };
        let padded = radius_m * QUERY_PAD_FACTOR + QUERY_PAD_METERS;

        let mut found: Vec<(usize, f64)> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(origin, padded * padded)
            .into_iter()
            .map(|hit| hit.item as usize)
            .filter(|&other| other != idx)
            .filter_map(|other| {
                let distance = geometry::distance_meters(&cells[idx], &cells[other]);
                (distance <= radius_m).then_some((other, distance))
            })
            .collect();
        found.sort_unstable_by_key(|&(other, _)| other);
        found
    }
}
