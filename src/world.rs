//! World container and generation pipeline
//!
//! Owns the cells, the section grid and the landmasses, and answers the
//! queries collaborators need once a world exists.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::biomes::{classify_biome, Biome};
use crate::cell::{Cell, CellType, Landmass};
use crate::climate;
use crate::coords::Spherical;
use crate::elevation::{self, WaterBodyStats};
use crate::error::Result;
use crate::hydrology::{self, HydrologyStats};
use crate::land;
use crate::landmass;
use crate::mesh;
use crate::noise_field::NoiseField;
use crate::params::GenerationParams;
use crate::persistence;
use crate::sections::SectionIndex;
use crate::seeds::WorldSeeds;

/// Seed for landmass colors of worlds loaded from disk
const LOADED_COLOR_SEED: u64 = 0;

/// What happened during generation, kept for reporting
#[derive(Clone, Debug, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub sample_points: usize,
    pub expected_faces: usize,
    pub deep_ocean_cells: usize,
    pub oceanic_islands: usize,
    pub water_bodies: WaterBodyStats,
    pub hydrology: HydrologyStats,
    pub wind_visits: usize,
}

/// Summary of a world, suitable for JSON export
#[derive(Clone, Debug, Serialize)]
pub struct WorldStats {
    pub cells: usize,
    pub land_cells: usize,
    pub ocean_cells: usize,
    pub lake_cells: usize,
    pub landmasses: usize,
    pub largest_landmass: usize,
    /// Cell count per biome name
    pub biomes: BTreeMap<&'static str, usize>,
    /// Present only for worlds generated in this run
    pub generation: Option<GenerationReport>,
}

/// A generated or loaded world
pub struct World {
    seeds: Option<WorldSeeds>,
    cells: Vec<Cell>,
    index: SectionIndex,
    landmasses: Vec<Landmass>,
    report: Option<GenerationReport>,
}

/// Run `f`, logging how long the phase took.
fn phase<T>(name: &str, f: impl FnOnce() -> T) -> T {
    log::info!("{}...", name);
    let start = Instant::now();
    let out = f();
    log::info!("{} done in {:.2?}", name, start.elapsed());
    out
}

impl World {
    /// Generate a world from a master seed.
    pub fn generate(seed: u64, params: &GenerationParams) -> Result<Self> {
        Self::generate_with_seeds(WorldSeeds::from_master(seed), params)
    }

    /// Generate a world with explicit per-system seeds.
    pub fn generate_with_seeds(seeds: WorldSeeds, params: &GenerationParams) -> Result<Self> {
        log::info!("Generating world ({}, face size {})", seeds, params.face_size);
        let total = Instant::now();

        let (mut cells, sample_points) =
            phase("Building mesh", || mesh::generate_mesh(params, &mut WorldSeeds::rng(seeds.mesh)))?;
        let expected_faces = mesh::expected_face_count(sample_points);
        if cells.len() != expected_faces {
            log::warn!(
                "mesh has {} faces, expected {} for {} points",
                cells.len(),
                expected_faces,
                sample_points
            );
        }
        log::debug!("{} sample points, {} cells", sample_points, cells.len());

        let index = phase("Indexing sections", || SectionIndex::build(&cells));
        let noise = NoiseField::new(&seeds);

        let land_report = phase("Seeding land", || {
            land::classify(&mut cells, &index, &noise, params, &mut WorldSeeds::rng(seeds.land))
        });
        phase("Setting heights", || elevation::assign_heights(&mut cells, &index, &noise, params));
        let bodies = phase("Setting water types", || elevation::classify_water_bodies(&mut cells, &index, params));
        let water_bodies = elevation::water_body_stats(&bodies);
        log::debug!(
            "{} ocean bodies, {} dried basins",
            water_bodies.ocean_count,
            water_bodies.dried_basins
        );

        let hydrology = phase("Running rivers", || {
            hydrology::simulate(
                &mut cells,
                &index,
                &land_report.island_roots,
                params,
                &mut WorldSeeds::rng(seeds.hydrology),
            )
        });
        phase("Setting aridity", || climate::assign_aridity(&mut cells, &index, &noise, params));
        let wind_visits = phase("Setting foehn", || climate::set_foehn(&mut cells, params));
        let landmasses = phase("Segmenting landmasses", || {
            landmass::segment(&mut cells, &mut WorldSeeds::rng(seeds.landmass))
        });

        log::info!("World generated in {:.2?}", total.elapsed());

        let report = GenerationReport {
            seed: seeds.master,
            sample_points,
            expected_faces,
            deep_ocean_cells: land_report.deep_ocean_cells,
            oceanic_islands: land_report.island_roots.len(),
            water_bodies,
            hydrology,
            wind_visits,
        };

        Ok(Self {
            seeds: Some(seeds),
            cells,
            index,
            landmasses,
            report: Some(report),
        })
    }

    /// Build a world around already-populated cells: index them and segment
    /// their landmasses.
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        let index = SectionIndex::build(&cells);
        let landmasses = landmass::segment(&mut cells, &mut WorldSeeds::rng(LOADED_COLOR_SEED));
        Self {
            seeds: None,
            cells,
            index,
            landmasses,
            report: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let cells = persistence::load_cells(path)?;
        log::info!("Loaded {} cells from {}", cells.len(), path.display());
        Ok(Self::from_cells(cells))
    }

    /// Replace this world with the one stored at `path`. On error the current
    /// world is left untouched.
    pub fn replace(&mut self, path: &Path) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_cells(&self.cells, path)?;
        log::info!("Saved {} cells to {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Seeds the world was generated with; `None` for loaded worlds.
    pub fn seeds(&self) -> Option<&WorldSeeds> {
        self.seeds.as_ref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn landmasses(&self) -> &[Landmass] {
        &self.landmasses
    }

    /// Cell under the given coordinate (degrees, polar latitude).
    pub fn cell_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.index.cell_at(&self.cells, Spherical::new(lon, lat))
    }

    /// Biome of cell `id`, or `None` if there is no such cell.
    pub fn biome(&self, id: usize) -> Option<&'static Biome> {
        let c = self.cells.get(id)?;
        Some(classify_biome(c.height, c.aridity, c.foehn, c.cell_type))
    }

    pub fn stats(&self) -> WorldStats {
        let count = |t: CellType| self.cells.iter().filter(|c| c.is(t)).count();
        let mut biomes = BTreeMap::new();
        for c in &self.cells {
            let biome = classify_biome(c.height, c.aridity, c.foehn, c.cell_type);
            *biomes.entry(biome.name).or_insert(0) += 1;
        }

        WorldStats {
            cells: self.cells.len(),
            land_cells: count(CellType::Land),
            ocean_cells: count(CellType::Ocean),
            lake_cells: count(CellType::InlandLake),
            landmasses: self.landmasses.len(),
            largest_landmass: self.landmasses.iter().map(Landmass::len).max().unwrap_or(0),
            biomes,
            generation: self.report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorldError;

    fn small_world() -> World {
        World::generate(42, &GenerationParams::with_face_size(6.0)).unwrap()
    }

    #[test]
    fn test_seed_42_scenario() {
        let world = World::generate(42, &GenerationParams::default()).unwrap();
        let stats = world.stats();
        let report = stats.generation.as_ref().unwrap();

        let faces = stats.cells as f64;
        let expected = report.expected_faces as f64;
        assert!((faces - expected).abs() / expected < 0.01);
        assert!(world.cells().iter().all(|c| c.neighbors.len() == 3));
        assert!(stats.ocean_cells > 0);
        assert!(stats.land_cells > 0);
        // Rivers drain most land to the sea instead of drowning it
        assert!(stats.land_cells > stats.lake_cells);
    }

    #[test]
    fn test_generation_invariants() {
        let world = small_world();
        let cells = world.cells();

        for (i, c) in cells.iter().enumerate() {
            assert_eq!(c.neighbors.len(), 3);
            for &n in &c.neighbors {
                assert!(cells[n].neighbors.contains(&i));
            }
            assert!(!c.is(CellType::Flowing) && !c.is(CellType::Stagnant) && !c.is(CellType::Water));
            if c.is(CellType::Land) {
                assert!(c.height >= 0.0);
                assert!(c.landmass.is_some());
            }
        }

        let land: usize = world.landmasses().iter().map(Landmass::len).sum();
        assert_eq!(land, world.stats().land_cells);
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = small_world();
        let b = small_world();
        assert_eq!(a.cells().len(), b.cells().len());
        for (x, y) in a.cells().iter().zip(b.cells()) {
            assert_eq!(x.cell_type, y.cell_type);
            assert_eq!(x.height, y.height);
            assert_eq!(x.foehn, y.foehn);
        }
    }

    #[test]
    fn test_cell_at_and_biome() {
        let world = small_world();
        let id = world.cell_at(123.0, 45.0).unwrap();
        let c = world.cell(id).unwrap();
        assert!((c.center().lon - 123.0).abs() < 20.0);
        assert!((c.center().lat - 45.0).abs() < 20.0);
        assert_eq!(world.biome(id), Some(classify_biome(c.height, c.aridity, c.foehn, c.cell_type)));
        assert_eq!(world.biome(world.cells().len()), None);
        assert!(world.cell(world.cells().len()).is_none());
    }

    #[test]
    fn test_save_load_replace() {
        let world = small_world();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.tsv");
        world.save(&path).unwrap();

        let loaded = World::load(&path).unwrap();
        assert!(loaded.seeds().is_none());
        assert_eq!(loaded.cells().len(), world.cells().len());
        assert_eq!(loaded.landmasses().len(), world.landmasses().len());
        for (a, b) in world.cells().iter().zip(loaded.cells()) {
            assert_eq!(a.neighbors, b.neighbors);
            assert_eq!(a.cell_type, b.cell_type);
        }

        // A bad file leaves the current world in place
        let bad = dir.path().join("bad.tsv");
        std::fs::write(&bad, "0\t1\n").unwrap();
        let mut current = loaded;
        let before = current.cells().len();
        assert!(matches!(current.replace(&bad), Err(WorldError::Format { .. })));
        assert_eq!(current.cells().len(), before);

        current.replace(&path).unwrap();
        assert_eq!(current.cells().len(), before);
    }
}
