//! Landmass segmentation: connected components of land cells.

use std::collections::VecDeque;

use rand::Rng;

use crate::cell::{Cell, CellType, Landmass};

/// Group every land cell into its connected landmass.
///
/// Any previous assignment is cleared first, so this can be re-run on a
/// loaded world. Each landmass gets a random display color.
pub fn segment<R: Rng>(cells: &mut [Cell], rng: &mut R) -> Vec<Landmass> {
    for cell in cells.iter_mut() {
        cell.landmass = None;
    }

    let mut landmasses = Vec::new();
    for seed in 0..cells.len() {
        if !cells[seed].is(CellType::Land) || cells[seed].landmass.is_some() {
            continue;
        }

        let id = landmasses.len();
        let mut landmass = Landmass::new(id, [rng.gen(), rng.gen(), rng.gen()]);
        cells[seed].landmass = Some(id);
        let mut queue = VecDeque::from([seed]);

        while let Some(c) = queue.pop_front() {
            landmass.members.push(c);
            for k in 0..cells[c].neighbors.len() {
                let n = cells[c].neighbors[k];
                if cells[n].is(CellType::Land) && cells[n].landmass.is_none() {
                    cells[n].landmass = Some(id);
                    queue.push_back(n);
                }
            }
        }

        landmasses.push(landmass);
    }

    log::debug!("{} landmasses", landmasses.len());
    landmasses
}
