//! Coarse longitude × latitude bucket grid for nearest-cell queries.
//!
//! Searches start in the bucket holding the origin and grow ring by ring.
//! Once any candidate turns up, one more ring is scanned before the closest
//! candidate is returned. This is an approximation: for sparse targets the
//! true nearest cell may sit beyond that extra ring.

use glam::DVec3;

use crate::cell::{Cell, CellType};
use crate::coords::{angular_distance, lon_scale, Spherical};

/// Buckets around the equator
pub const SECTION_LON: usize = 36;
/// Buckets from pole to pole
pub const SECTION_LAT: usize = 18;
/// Angular size of one bucket in degrees
pub const SECTION_DEGREES: f64 = 10.0;

/// One grid bucket and the cells whose centroid falls inside it.
#[derive(Clone, Debug, Default)]
pub struct Section {
    pub lon: usize,
    pub lat: usize,
    pub members: Vec<usize>,
}

/// The section grid of a world. Built once, read-only afterwards.
#[derive(Clone, Debug)]
pub struct SectionIndex {
    sections: Vec<Section>,
}

fn slot(lon: usize, lat: usize) -> usize {
    lon * SECTION_LAT + lat
}

/// Half-width of a ring row in buckets, widened toward the poles by the same
/// `1 / sin(lat)` stretch the sampler uses. Evaluated at the band's poleward
/// edge and capped at a full turn.
fn ring_half_width(lat: usize) -> isize {
    let north_edge = lat as f64 * SECTION_DEGREES;
    let south_edge = 180.0 - (lat + 1) as f64 * SECTION_DEGREES;
    let polar = north_edge.min(south_edge).max(0.0);
    lon_scale(polar).min((SECTION_LON / 2) as f64) as isize
}

impl SectionIndex {
    pub fn build(cells: &[Cell]) -> Self {
        let mut sections: Vec<Section> = (0..SECTION_LON * SECTION_LAT)
            .map(|i| Section {
                lon: i / SECTION_LAT,
                lat: i % SECTION_LAT,
                members: Vec::new(),
            })
            .collect();

        for (id, cell) in cells.iter().enumerate() {
            let (lon, lat) = Self::locate(cell.center());
            sections[slot(lon, lat)].members.push(id);
        }

        Self { sections }
    }

    /// Bucket coordinates of a point.
    pub fn locate(p: Spherical) -> (usize, usize) {
        let lon = ((p.lon / SECTION_DEGREES).floor().max(0.0) as usize).min(SECTION_LON - 1);
        let lat = ((p.lat / SECTION_DEGREES).floor().max(0.0) as usize).min(SECTION_LAT - 1);
        (lon, lat)
    }

    pub fn section(&self, lon: usize, lat: usize) -> &Section {
        &self.sections[slot(lon, lat)]
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Next ring of unexplored buckets around `frontier`. Marks them explored.
    fn expand(&self, frontier: &[(usize, usize)], explored: &mut [bool]) -> Vec<(usize, usize)> {
        let mut ring = Vec::new();
        for &(lon, lat) in frontier {
            for dlat in -1isize..=1 {
                let row = (lat as isize + dlat).clamp(0, SECTION_LAT as isize - 1) as usize;
                let width = ring_half_width(row);
                for dlon in -width..=width {
                    if dlon == 0 && dlat == 0 {
                        continue;
                    }
                    let col = (lon as isize + dlon).rem_euclid(SECTION_LON as isize) as usize;
                    let s = slot(col, row);
                    if !explored[s] {
                        explored[s] = true;
                        ring.push((col, row));
                    }
                }
            }
        }
        ring
    }

    /// Closest cell (by great-circle angle from `origin`) satisfying `accept`,
    /// with its distance in radians. Ties go to the lower cell index.
    ///
    /// The search stops one ring past the first ring holding a candidate, so
    /// with sparse targets a slightly closer cell further out in bucket terms
    /// can be missed.
    pub fn nearest_where<F>(&self, cells: &[Cell], origin: DVec3, accept: F) -> Option<(usize, f64)>
    where
        F: Fn(&Cell) -> bool,
    {
        let start = Self::locate(Spherical::from_vec(origin));
        let mut explored = vec![false; self.sections.len()];
        explored[slot(start.0, start.1)] = true;

        let mut frontier = vec![start];
        let mut best: Option<(usize, f64)> = None;
        let mut found = false;

        while !frontier.is_empty() {
            for &(lon, lat) in &frontier {
                for &id in &self.section(lon, lat).members {
                    let cell = &cells[id];
                    if !accept(cell) {
                        continue;
                    }
                    let d = angular_distance(origin, cell.center_c());
                    let closer = match best {
                        None => true,
                        Some((b, bd)) => d < bd || (d == bd && id < b),
                    };
                    if closer {
                        best = Some((id, d));
                    }
                }
            }

            if best.is_some() {
                if found {
                    return best;
                }
                found = true;
            }
            frontier = self.expand(&frontier, &mut explored);
        }

        best
    }

    /// Nearest cell of `cell_type` to cell `origin`, with its distance.
    /// A cell already of that type is its own nearest at distance 0.
    pub fn find_nearest(&self, cells: &[Cell], origin: usize, cell_type: CellType) -> Option<(usize, f64)> {
        if cells[origin].cell_type == cell_type {
            return Some((origin, 0.0));
        }
        self.nearest_where(cells, cells[origin].center_c(), |c| c.cell_type == cell_type)
    }

    /// Cell whose centroid is nearest to `coord`.
    pub fn cell_at(&self, cells: &[Cell], coord: Spherical) -> Option<usize> {
        self.nearest_where(cells, coord.to_unit(), |_| true)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generate_mesh;
    use crate::params::GenerationParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mesh(face_size: f64) -> Vec<Cell> {
        let params = GenerationParams::with_face_size(face_size);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        generate_mesh(&params, &mut rng).unwrap().0
    }

    #[test]
    fn test_every_cell_indexed_once() {
        let cells = mesh(8.0);
        let index = SectionIndex::build(&cells);
        let mut seen = vec![0; cells.len()];
        for s in index.sections() {
            for &m in &s.members {
                seen[m] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_ring_width_widens_toward_poles() {
        assert_eq!(ring_half_width(0), 18);
        assert_eq!(ring_half_width(17), 18);
        assert_eq!(ring_half_width(8), 1);
        assert!(ring_half_width(1) > ring_half_width(4));
    }

    #[test]
    fn test_find_nearest_same_type_is_self() {
        let cells = mesh(8.0);
        let index = SectionIndex::build(&cells);
        assert_eq!(index.find_nearest(&cells, 3, CellType::Water), Some((3, 0.0)));
    }

    #[test]
    fn test_find_nearest_none_when_type_absent() {
        let cells = mesh(8.0);
        let index = SectionIndex::build(&cells);
        assert_eq!(index.find_nearest(&cells, 0, CellType::Ocean), None);
    }

    #[test]
    fn test_find_nearest_single_target_across_globe() {
        let mut cells = mesh(8.0);
        let index = SectionIndex::build(&cells);
        let target = cells.len() - 1;
        cells[target].cell_type = CellType::Land;
        for origin in [0, cells.len() / 3, cells.len() / 2] {
            let (found, d) = index.find_nearest(&cells, origin, CellType::Land).unwrap();
            assert_eq!(found, target);
            let expected = angular_distance(cells[origin].center_c(), cells[target].center_c());
            assert!((d - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cell_at_matches_brute_force() {
        let cells = mesh(6.0);
        let index = SectionIndex::build(&cells);
        for i in 0..40 {
            let coord = Spherical::new((i as f64 * 37.3) % 360.0, 5.0 + (i as f64 * 17.9) % 170.0);
            let p = coord.to_unit();
            let brute = (0..cells.len())
                .min_by(|&a, &b| {
                    angular_distance(p, cells[a].center_c())
                        .partial_cmp(&angular_distance(p, cells[b].center_c()))
                        .unwrap()
                })
                .unwrap();
            let found = index.cell_at(&cells, coord).unwrap();
            let df = angular_distance(p, cells[found].center_c());
            let db = angular_distance(p, cells[brute].center_c());
            assert!((df - db).abs() < 1e-12, "query {:?}: {} vs {}", coord, found, brute);
        }
    }

    #[test]
    fn test_sparse_targets_stay_close_to_brute_force() {
        let mut cells = mesh(3.0);
        let index = SectionIndex::build(&cells);
        let targets: Vec<usize> = (0..cells.len()).step_by(200).collect();
        for &t in &targets {
            cells[t].cell_type = CellType::Land;
        }
        let slack = 2.0 * SECTION_DEGREES.to_radians();

        for origin in (0..cells.len()).step_by(7) {
            let p = cells[origin].center_c();
            let brute = targets
                .iter()
                .map(|&t| angular_distance(p, cells[t].center_c()))
                .fold(f64::INFINITY, f64::min);
            let (found, d) = index.find_nearest(&cells, origin, CellType::Land).unwrap();
            assert!(cells[found].is(CellType::Land));
            assert!(d >= brute - 1e-12);
            assert!(d <= brute + slack, "origin {}: {} vs {}", origin, d, brute);
        }
    }
}
