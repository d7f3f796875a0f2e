//! Elevation field and water body typing
//!
//! Land height grows with distance from the sea plus fractal noise. Water
//! bodies are then flood-filled: small ones dry out into land basins, the
//! rest become ocean.

use std::collections::VecDeque;

use serde::Serialize;

use crate::cell::{Cell, CellType};
use crate::noise_field::{Channel, NoiseField};
use crate::params::GenerationParams;
use crate::sections::SectionIndex;

/// Weight of sea distance (radians) in the height of a land cell
const COAST_DISTANCE_WEIGHT: f64 = 2.0;
/// Divisor applied to the fractal noise term
const NOISE_DIVISOR: f64 = 3.0;

/// What a connected water extent turned into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WaterBodyType {
    Ocean,
    /// Too small to hold water; reclassified as land
    DriedBasin,
}

/// Information about a water body
#[derive(Clone, Debug, Serialize)]
pub struct WaterBody {
    pub body_type: WaterBodyType,
    pub cell_count: usize,
    /// Lowest cell index in the extent, a stable handle for the body
    pub anchor: usize,
}

/// Height of one land cell at angular distance `sea_distance` from water.
pub fn land_height(sea_distance: f64, noise: f64, multiplier: f32) -> f32 {
    let raw = sea_distance * COAST_DISTANCE_WEIGHT + noise / NOISE_DIVISOR;
    raw.max(0.0) as f32 * multiplier
}

/// Set the height of every land cell.
pub fn assign_heights(cells: &mut [Cell], index: &SectionIndex, noise: &NoiseField, params: &GenerationParams) {
    for id in 0..cells.len() {
        if !cells[id].is(CellType::Land) {
            continue;
        }
        let sea_distance = index
            .find_nearest(cells, id, CellType::Water)
            .map_or(std::f64::consts::PI, |(_, d)| d);
        let pm = noise.fractal(Channel::Elevation, cells[id].center_c());
        cells[id].height = land_height(sea_distance, pm, params.height_multiplier);
    }
}

/// All water cells connected to `start` through water.
pub fn water_extent(cells: &[Cell], start: usize) -> Vec<usize> {
    let mut visited = vec![false; cells.len()];
    let mut extent = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(id) = queue.pop_front() {
        extent.push(id);
        for &n in &cells[id].neighbors {
            if !visited[n] && cells[n].is(CellType::Water) {
                visited[n] = true;
                queue.push_back(n);
            }
        }
    }

    extent
}

/// Resolve every water extent into ocean or a dried basin.
///
/// A dried cell takes the height of the nearest land cell outside its extent.
pub fn classify_water_bodies(cells: &mut [Cell], index: &SectionIndex, params: &GenerationParams) -> Vec<WaterBody> {
    let mut bodies = Vec::new();

    for id in 0..cells.len() {
        if !cells[id].is(CellType::Water) {
            continue;
        }
        let extent = water_extent(cells, id);

        if extent.len() < params.inland_lake_size {
            let view: &[Cell] = cells;
            let heights: Vec<f32> = extent
                .iter()
                .map(|&e| {
                    index
                        .nearest_where(view, view[e].center_c(), |c| c.is(CellType::Land))
                        .map_or(0.0, |(land, _)| view[land].height)
                })
                .collect();
            for (&e, h) in extent.iter().zip(heights) {
                cells[e].cell_type = CellType::Land;
                cells[e].height = h;
            }
            bodies.push(WaterBody {
                body_type: WaterBodyType::DriedBasin,
                cell_count: extent.len(),
                anchor: id,
            });
        } else {
            for &e in &extent {
                cells[e].cell_type = CellType::Ocean;
            }
            bodies.push(WaterBody {
                body_type: WaterBodyType::Ocean,
                cell_count: extent.len(),
                anchor: id,
            });
        }
    }

    bodies
}

/// Summary statistics for the water body pass
#[derive(Clone, Debug, Default, Serialize)]
pub struct WaterBodyStats {
    pub ocean_count: usize,
    pub ocean_cells: usize,
    pub dried_basins: usize,
    pub dried_cells: usize,
}

pub fn water_body_stats(bodies: &[WaterBody]) -> WaterBodyStats {
    let mut stats = WaterBodyStats::default();
    for body in bodies {
        match body.body_type {
            WaterBodyType::Ocean => {
                stats.ocean_count += 1;
                stats.ocean_cells += body.cell_count;
            }
            WaterBodyType::DriedBasin => {
                stats.dried_basins += 1;
                stats.dried_cells += body.cell_count;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generate_mesh;
    use crate::seeds::WorldSeeds;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mesh() -> Vec<Cell> {
        let params = GenerationParams::with_face_size(8.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        generate_mesh(&params, &mut rng).unwrap().0
    }

    #[test]
    fn test_land_height_clamped_non_negative() {
        assert_eq!(land_height(0.0, -1.0, 1.0), 0.0);
        assert!((land_height(0.5, 0.0, 2.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_heights_non_negative_on_land_only() {
        let mut cells = mesh();
        let half = cells.len() / 2;
        for c in cells.iter_mut().take(half) {
            c.cell_type = CellType::Land;
        }
        let index = SectionIndex::build(&cells);
        let noise = NoiseField::new(&WorldSeeds::from_master(1));
        assign_heights(&mut cells, &index, &noise, &GenerationParams::default());

        for c in cells.iter().filter(|c| c.is(CellType::Land)) {
            assert!(c.height >= 0.0);
        }
        for c in cells.iter().filter(|c| c.is(CellType::Water)) {
            assert_eq!(c.height, 0.0);
        }
    }

    #[test]
    fn test_water_extent_follows_water_only() {
        let mut cells = mesh();
        for c in cells.iter_mut() {
            c.cell_type = CellType::Land;
        }
        let start = 5;
        let nb = cells[start].neighbors[0];
        cells[start].cell_type = CellType::Water;
        cells[nb].cell_type = CellType::Water;

        let mut extent = water_extent(&cells, start);
        extent.sort_unstable();
        let mut expected = vec![start, nb];
        expected.sort_unstable();
        assert_eq!(extent, expected);
    }

    #[test]
    fn test_small_pond_dries_and_copies_neighbor_height() {
        let mut cells = mesh();
        for c in cells.iter_mut() {
            c.cell_type = CellType::Land;
            c.height = 0.75;
        }
        cells[0].cell_type = CellType::Water;
        cells[0].height = 0.0;
        let index = SectionIndex::build(&cells);

        let bodies = classify_water_bodies(&mut cells, &index, &GenerationParams::default());
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].body_type, WaterBodyType::DriedBasin);
        assert!(cells[0].is(CellType::Land));
        assert_eq!(cells[0].height, 0.75);
    }

    #[test]
    fn test_large_extent_becomes_ocean() {
        let mut cells = mesh();
        let index = SectionIndex::build(&cells);
        let bodies = classify_water_bodies(&mut cells, &index, &GenerationParams::default());

        let stats = water_body_stats(&bodies);
        assert_eq!(stats.ocean_count, 1);
        assert_eq!(stats.ocean_cells, cells.len());
        assert!(cells.iter().all(|c| c.is(CellType::Ocean)));
    }
}
