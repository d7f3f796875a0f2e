//! Land/water classification
//!
//! Every cell starts as water. Continental islands grow from random discs,
//! then oceanic islands sprout along noise bands far out at sea.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cell::{Cell, CellType};
use crate::coords::angular_distance;
use crate::noise_field::{Channel, NoiseField};
use crate::params::GenerationParams;
use crate::sections::SectionIndex;

/// Outcome of the classification pass
#[derive(Clone, Debug, Default)]
pub struct LandReport {
    pub land_cells: usize,
    /// Cells flagged as deep ocean before the oceanic islands grew
    pub deep_ocean_cells: usize,
    /// Roots of the oceanic islands, in acceptance order
    pub island_roots: Vec<usize>,
}

/// Turn `root` and every sea cell within `depth` hops of it (through sea
/// cells) into land. A root that is already land is left alone and does not
/// spread. Returns the number of converted cells.
pub fn raise_land(cells: &mut [Cell], root: usize, depth: usize) -> usize {
    if !cells[root].cell_type.is_sea() {
        return 0;
    }

    let mut converted = 1;
    cells[root].cell_type = CellType::Land;
    let mut queue = VecDeque::from([(root, 0usize)]);

    while let Some((id, d)) = queue.pop_front() {
        if d >= depth {
            continue;
        }
        for k in 0..cells[id].neighbors.len() {
            let n = cells[id].neighbors[k];
            if cells[n].cell_type.is_sea() {
                cells[n].cell_type = CellType::Land;
                converted += 1;
                queue.push_back((n, d + 1));
            }
        }
    }

    converted
}

/// Grow continental islands around random disc origins.
pub fn seed_islands<R: Rng>(cells: &mut [Cell], params: &GenerationParams, rng: &mut R) -> usize {
    let mut converted = 0;
    for _ in 0..params.island_seed_count {
        let origin = cells[rng.gen_range(0..cells.len())].center_c();
        let radius = rng.gen_range(params.island_radius.0..params.island_radius.1);
        for id in 0..cells.len() {
            if angular_distance(origin, cells[id].center_c()) < radius {
                converted += raise_land(cells, id, params.island_branching);
            }
        }
    }
    converted
}

/// Grow up to `max_roots` islands from the deep-ocean `pool`. A root is used
/// only if it is still deep ocean and the island noise channel is non-negative
/// there.
fn grow_oceanic_islands<R: Rng>(
    cells: &mut [Cell],
    pool: &mut Vec<usize>,
    (max_roots, max_depth): (usize, f64),
    channel: Channel,
    noise: &NoiseField,
    rng: &mut R,
    roots: &mut Vec<usize>,
) {
    let mut accepted = 0;
    while accepted < max_roots {
        let Some(root) = pool.pop() else { break };
        if cells[root].cell_type != CellType::DeepOcean || noise.sample(channel, cells[root].center_c()) < 0.0 {
            continue;
        }
        let depth = (rng.gen::<f64>() * max_depth) as usize;
        raise_land(cells, root, depth);
        roots.push(root);
        accepted += 1;
    }
}

/// Mark remote water on either deep-ocean noise band, raise oceanic islands
/// from a random subset, then return untouched deep ocean to plain water.
pub fn seed_oceanic_islands<R: Rng>(
    cells: &mut [Cell],
    index: &SectionIndex,
    noise: &NoiseField,
    params: &GenerationParams,
    rng: &mut R,
) -> (usize, Vec<usize>) {
    let mut primary = Vec::new();
    let mut secondary = Vec::new();

    for id in 0..cells.len() {
        if cells[id].cell_type != CellType::Water {
            continue;
        }
        let distance = index
            .find_nearest(cells, id, CellType::Land)
            .map_or(std::f64::consts::PI, |(_, d)| d);
        if distance <= params.deep_ocean_distance {
            continue;
        }
        let pos = cells[id].center_c();
        if noise.band(Channel::DeepOceanPrimary, pos).abs() < params.deep_ocean_band {
            cells[id].cell_type = CellType::DeepOcean;
            primary.push(id);
        } else if noise.band(Channel::DeepOceanSecondary, pos).abs() < params.deep_ocean_band {
            cells[id].cell_type = CellType::DeepOcean;
            secondary.push(id);
        }
    }
    let deep_count = primary.len() + secondary.len();

    primary.shuffle(rng);
    secondary.shuffle(rng);

    let mut roots = Vec::new();
    grow_oceanic_islands(
        cells,
        &mut primary,
        params.deep_islands_primary,
        Channel::DeepIslandPrimary,
        noise,
        rng,
        &mut roots,
    );
    grow_oceanic_islands(
        cells,
        &mut secondary,
        params.deep_islands_secondary,
        Channel::DeepIslandSecondary,
        noise,
        rng,
        &mut roots,
    );

    for cell in cells.iter_mut() {
        if cell.cell_type == CellType::DeepOcean {
            cell.cell_type = CellType::Water;
        }
    }

    (deep_count, roots)
}

/// Full land/water pass.
pub fn classify<R: Rng>(
    cells: &mut [Cell],
    index: &SectionIndex,
    noise: &NoiseField,
    params: &GenerationParams,
    rng: &mut R,
) -> LandReport {
    seed_islands(cells, params, rng);
    let (deep_ocean_cells, island_roots) = seed_oceanic_islands(cells, index, noise, params, rng);
    let land_cells = cells.iter().filter(|c| c.is(CellType::Land)).count();
    log::debug!(
        "{} land cells, {} deep ocean cells, {} oceanic island roots",
        land_cells,
        deep_ocean_cells,
        island_roots.len()
    );
    LandReport {
        land_cells,
        deep_ocean_cells,
        island_roots,
    }
}
