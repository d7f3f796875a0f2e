//! River and lake simulation
//!
//! Springs turn into flowing river heads that walk downhill one cell per
//! round. A head that drops into a closed basin floods it up to the level of
//! its entry cell and spills over the rim, which restarts drainage from there.
//! Every cell a river passes through ends up as an inland lake cell, so the
//! simulation reaches a fixpoint once no flowing cell remains.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rand::Rng;
use serde::Serialize;

use crate::cell::{borders, Cell, CellType};
use crate::params::GenerationParams;
use crate::sections::SectionIndex;

/// Counters collected over one hydrology run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HydrologyStats {
    pub springs: usize,
    pub rounds: usize,
    /// Closed basins flooded
    pub basins: usize,
    /// Rim cells promoted to river heads by overflowing basins
    pub outlets: usize,
    pub lake_cells: usize,
}

/// Facts about the terrain that stay fixed for the whole simulation.
///
/// Heights and ocean cells never change while rivers run, so drainage and
/// ocean distances are computed at most once per cell.
struct Drainage<'a> {
    index: &'a SectionIndex,
    /// Cell reaches the ocean through cells no higher than itself
    drains: Vec<bool>,
    ocean_distance: Vec<Option<f64>>,
}

impl<'a> Drainage<'a> {
    fn new(cells: &[Cell], index: &'a SectionIndex) -> Self {
        Self {
            index,
            drains: drainage_map(cells),
            ocean_distance: vec![None; cells.len()],
        }
    }

    fn ocean_distance(&mut self, cells: &[Cell], id: usize) -> f64 {
        if let Some(d) = self.ocean_distance[id] {
            return d;
        }
        let d = self
            .index
            .find_nearest(cells, id, CellType::Ocean)
            .map_or(std::f64::consts::PI, |(_, d)| d);
        self.ocean_distance[id] = Some(d);
        d
    }

    /// Lowest land neighbor of `id`. Ties go to the neighbor nearer the ocean,
    /// then to the lower index.
    fn lowest_land_neighbor(&mut self, cells: &[Cell], id: usize) -> Option<usize> {
        let mut best: Option<(usize, f32, f64)> = None;
        for &n in &cells[id].neighbors {
            if !cells[n].is(CellType::Land) {
                continue;
            }
            let h = cells[n].height;
            let d = self.ocean_distance(cells, n);
            let better = match best {
                None => true,
                Some((b, bh, bd)) => h < bh || (h == bh && (d < bd || (d == bd && n < b))),
            };
            if better {
                best = Some((n, h, d));
            }
        }
        best.map(|(n, _, _)| n)
    }

    /// Highest land neighbor of `id`. Ties go to the neighbor farther from the
    /// ocean, then to the lower index.
    fn highest_land_neighbor(&mut self, cells: &[Cell], id: usize) -> Option<usize> {
        let mut best: Option<(usize, f32, f64)> = None;
        for &n in &cells[id].neighbors {
            if !cells[n].is(CellType::Land) {
                continue;
            }
            let h = cells[n].height;
            let d = self.ocean_distance(cells, n);
            let better = match best {
                None => true,
                Some((b, bh, bd)) => h > bh || (h == bh && (d > bd || (d == bd && n < b))),
            };
            if better {
                best = Some((n, h, d));
            }
        }
        best.map(|(n, _, _)| n)
    }
}

#[derive(Clone, Copy, Debug)]
struct SpillItem {
    level: f32,
    id: usize,
}

impl PartialEq for SpillItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SpillItem {}

impl PartialOrd for SpillItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Min-heap by level, then by index
impl Ord for SpillItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .total_cmp(&self.level)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Lowest level the water of each cell must rise to before it reaches an
/// ocean cell: the minimum over all paths to the ocean of the highest cell on
/// the path, the cell itself included. Cells with no path to an ocean get
/// infinity.
pub fn spill_levels(cells: &[Cell]) -> Vec<f32> {
    let mut spill = vec![f32::INFINITY; cells.len()];
    let mut done = vec![false; cells.len()];
    let mut heap = BinaryHeap::new();
    for (id, cell) in cells.iter().enumerate() {
        if cell.is(CellType::Ocean) {
            spill[id] = cell.height;
            heap.push(SpillItem { level: cell.height, id });
        }
    }

    while let Some(SpillItem { level, id }) = heap.pop() {
        if done[id] {
            continue;
        }
        done[id] = true;
        for &n in &cells[id].neighbors {
            let through = cells[n].height.max(level);
            if !done[n] && through < spill[n] {
                spill[n] = through;
                heap.push(SpillItem { level: through, id: n });
            }
        }
    }

    spill
}

/// Which cells can reach an ocean cell through neighbors no higher than
/// the cell itself. Ocean cells always drain.
pub fn drainage_map(cells: &[Cell]) -> Vec<bool> {
    spill_levels(cells)
        .iter()
        .zip(cells)
        .map(|(&level, cell)| cell.is(CellType::Ocean) || level <= cell.height)
        .collect()
}

/// Mark every land cell reachable from `start` through land no higher than
/// `level` as stagnant. Returns the number of cells flooded.
pub fn flood_basin(cells: &mut [Cell], start: usize, level: f32) -> usize {
    let mut flooded = 0;
    let mut queue = VecDeque::new();
    if cells[start].is(CellType::Land) {
        cells[start].cell_type = CellType::Stagnant;
        flooded += 1;
        queue.push_back(start);
    }

    while let Some(id) = queue.pop_front() {
        for k in 0..cells[id].neighbors.len() {
            let n = cells[id].neighbors[k];
            if cells[n].is(CellType::Land) && cells[n].height <= level {
                cells[n].cell_type = CellType::Stagnant;
                flooded += 1;
                queue.push_back(n);
            }
        }
    }

    flooded
}

/// Stagnant cells of the region around `start` that touch land, in
/// discovery order.
pub fn lake_edges(cells: &[Cell], start: usize) -> Vec<usize> {
    let mut visited = vec![false; cells.len()];
    let mut edges = Vec::new();
    let mut stack = vec![start];
    visited[start] = true;

    while let Some(id) = stack.pop() {
        let mut shore = false;
        for &n in &cells[id].neighbors {
            match cells[n].cell_type {
                CellType::Land => shore = true,
                CellType::Stagnant if !visited[n] => {
                    visited[n] = true;
                    stack.push(n);
                }
                _ => {}
            }
        }
        if shore {
            edges.push(id);
        }
    }

    edges
}

/// Turn random land cells and some oceanic island roots into springs.
pub fn seed_springs<R: Rng>(cells: &mut [Cell], roots: &[usize], params: &GenerationParams, rng: &mut R) -> usize {
    let mut springs = 0;
    let chance = params.spring_chance.max(1);
    for cell in cells.iter_mut() {
        if cell.is(CellType::Land) && rng.gen_range(0..chance) == 0 {
            cell.cell_type = CellType::Flowing;
            springs += 1;
        }
    }
    for &root in roots {
        if cells[root].is(CellType::Land) && !borders(cells, root, CellType::Ocean) && rng.gen_bool(0.5) {
            cells[root].cell_type = CellType::Flowing;
            springs += 1;
        }
    }
    springs
}

/// One step of every river head present at the start of the round. Returns
/// false when there was nothing left to move.
fn iterate_rivers(cells: &mut [Cell], drainage: &mut Drainage, stats: &mut HydrologyStats) -> bool {
    let heads: Vec<usize> = (0..cells.len())
        .filter(|&i| cells[i].is(CellType::Flowing))
        .collect();
    if heads.is_empty() {
        return false;
    }

    for s in heads {
        if borders(cells, s, CellType::Ocean) {
            cells[s].cell_type = CellType::InlandLake;
            continue;
        }

        let lowest = drainage.lowest_land_neighbor(cells, s);
        cells[s].cell_type = CellType::InlandLake;
        let Some(low) = lowest else { continue };

        if !drainage.drains[low] {
            let level = cells[low].height;
            flood_basin(cells, low, level);
            stats.basins += 1;
            for edge in lake_edges(cells, low) {
                if let Some(rim) = drainage.highest_land_neighbor(cells, edge) {
                    cells[rim].cell_type = CellType::Flowing;
                    stats.outlets += 1;
                }
            }
        } else if cells[low].height <= cells[s].height {
            cells[low].cell_type = CellType::Flowing;
        }
    }

    true
}

/// Run rivers to a fixpoint, then settle leftover basins into lakes.
pub fn run_rivers(cells: &mut [Cell], index: &SectionIndex) -> HydrologyStats {
    let mut stats = HydrologyStats::default();
    let mut drainage = Drainage::new(cells, index);

    while iterate_rivers(cells, &mut drainage, &mut stats) {
        stats.rounds += 1;
        log::trace!("river round {} done", stats.rounds);
    }

    for cell in cells.iter_mut() {
        if cell.is(CellType::Stagnant) {
            cell.cell_type = CellType::InlandLake;
        }
    }
    stats.lake_cells = cells.iter().filter(|c| c.is(CellType::InlandLake)).count();
    stats
}

/// Full hydrology pass: springs, then rivers.
pub fn simulate<R: Rng>(
    cells: &mut [Cell],
    index: &SectionIndex,
    roots: &[usize],
    params: &GenerationParams,
    rng: &mut R,
) -> HydrologyStats {
    let springs = seed_springs(cells, roots, params, rng);
    let stats = HydrologyStats {
        springs,
        ..run_rivers(cells, index)
    };
    log::debug!(
        "{} springs, {} rounds, {} basins, {} outlets, {} lake cells",
        stats.springs,
        stats.rounds,
        stats.basins,
        stats.outlets,
        stats.lake_cells
    );
    stats
}
