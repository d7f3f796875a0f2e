//! Climate fields: aridity from lake distance and foehn from prevailing winds
//!
//! Winds blow along latitude bands that alternate between east and west.
//! Air crossing high ground dries out and carries that dryness downhill on
//! the lee side, fading with every hop and with latitude drift.

use serde::Serialize;

use crate::cell::{Cell, CellType};
use crate::coords::lon_delta;
use crate::noise_field::{Channel, NoiseField};
use crate::params::GenerationParams;
use crate::sections::SectionIndex;

/// Exponent applied to lake distance in the aridity formula
const LAKE_DISTANCE_EXPONENT: f64 = 0.6;
/// Exponent applied to height in the orographic factor
const OROGRAPHIC_EXPONENT: f64 = 1.25;

// =============================================================================
// ARIDITY
// =============================================================================

/// Aridity of a land cell `lake_distance` radians from the nearest lake.
pub fn aridity(lake_distance: f64, noise: f64, multiplier: f32) -> f32 {
    let raw = lake_distance.powf(LAKE_DISTANCE_EXPONENT) * 2.0 + noise / 2.0;
    raw.max(0.0) as f32 * multiplier
}

/// Set the aridity of every land cell.
pub fn assign_aridity(cells: &mut [Cell], index: &SectionIndex, noise: &NoiseField, params: &GenerationParams) {
    for id in 0..cells.len() {
        if !cells[id].is(CellType::Land) {
            continue;
        }
        let lake_distance = index
            .find_nearest(cells, id, CellType::InlandLake)
            .map_or(std::f64::consts::PI, |(_, d)| d);
        let pm = noise.fractal(Channel::Aridity, cells[id].center_c());
        cells[id].aridity = aridity(lake_distance, pm, params.aridity_multiplier);
    }
}

// =============================================================================
// WIND
// =============================================================================

/// Prevailing wind at a geographic latitude (degrees, 0 at the equator).
/// Positive blows east, negative west; magnitude at most 0.5.
pub fn wind_factor(geo_lat: f64) -> f64 {
    let a = (3.0 * geo_lat).to_radians();
    (a.sin().powi(2) / a.cos()).clamp(-1.0, 1.0) / 2.0
}

/// Signed foehn strength a land cell emits.
pub fn origin_strength(cell: &Cell) -> f64 {
    let h = (cell.height.max(0.0) as f64).powf(OROGRAPHIC_EXPONENT);
    wind_factor(cell.center().geographic_lat()) * h
}

/// Attenuation for a cell `lat_offset` degrees of latitude away from the
/// origin of the gust.
pub fn falloff(lat_offset: f64, band: f64) -> f64 {
    (1.0 - (lat_offset.abs() / band).sqrt()).max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WindDirection {
    East,
    West,
}

impl WindDirection {
    fn of(strength: f64) -> Self {
        if strength >= 0.0 {
            Self::East
        } else {
            Self::West
        }
    }

    /// True when moving from `from` to `to` longitude heads this way.
    fn heads(self, from: f64, to: f64) -> bool {
        let delta = lon_delta(from, to);
        match self {
            Self::East => delta > 0.0,
            Self::West => delta < 0.0,
        }
    }
}

/// One cell reached by a gust
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WindVisit {
    pub cell: usize,
    /// Foehn added to the cell
    pub strength: f64,
    /// Hops from the origin
    pub hops: usize,
}

/// Carry a gust of `strength` from `origin` downwind and downhill, adding it
/// to the foehn of every cell it reaches.
///
/// The sign of `strength` picks the direction; its magnitude is what gets
/// deposited. Each hop loses `wind_decrement` and is scaled by the latitude
/// falloff. Only land strictly lower than the cell it comes from is entered,
/// and no cell is entered twice.
pub fn propagate_wind(cells: &mut [Cell], origin: usize, strength: f64, params: &GenerationParams) -> Vec<WindVisit> {
    let direction = WindDirection::of(strength);
    let start_lat = cells[origin].center().lat;
    let mut visited = vec![false; cells.len()];
    let mut visits = Vec::new();
    let mut stack = vec![(origin, strength.abs(), 0usize)];

    while let Some((id, s, hops)) = stack.pop() {
        if visited[id] {
            continue;
        }
        visited[id] = true;
        cells[id].foehn += s as f32;
        visits.push(WindVisit {
            cell: id,
            strength: s,
            hops,
        });

        let carried = s - params.wind_decrement;
        if carried <= 0.0 {
            continue;
        }
        let here = &cells[id];
        // Reverse so the first neighbor is explored first
        for &n in here.neighbors.iter().rev() {
            let next = &cells[n];
            if visited[n]
                || !next.is(CellType::Land)
                || next.height >= here.height
                || !direction.heads(here.center().lon, next.center().lon)
            {
                continue;
            }
            let s = carried * falloff(next.center().lat - start_lat, params.wind_band);
            if s > 0.0 {
                stack.push((n, s, hops + 1));
            }
        }
    }

    visits
}

/// Accumulate foehn from every land cell. Returns the total number of visits.
pub fn set_foehn(cells: &mut [Cell], params: &GenerationParams) -> usize {
    let mut total = 0;
    for id in 0..cells.len() {
        if !cells[id].is(CellType::Land) {
            continue;
        }
        let strength = origin_strength(&cells[id]);
        total += propagate_wind(cells, id, strength, params).len();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Spherical;
    use crate::mesh::generate_mesh;
    use crate::seeds::WorldSeeds;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// A strip of land cells along the equator, descending eastward.
    fn slope(len: usize) -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..len)
            .map(|i| {
                let lon = i as f64 * 5.0;
                Cell::new(
                    Spherical::new(lon, 88.0),
                    Spherical::new(lon + 4.0, 90.0),
                    Spherical::new(lon, 92.0),
                )
            })
            .collect();
        for i in 0..len {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(i - 1);
            }
            if i + 1 < len {
                neighbors.push(i + 1);
            }
            cells[i].neighbors = neighbors;
            cells[i].cell_type = CellType::Land;
            cells[i].height = 1.0 - i as f32 * 0.01;
        }
        cells
    }

    #[test]
    fn test_wind_factor_bands() {
        assert_eq!(wind_factor(0.0), 0.0);
        assert!(wind_factor(20.0) > 0.0);
        assert!(wind_factor(45.0) < 0.0);
        assert_eq!(wind_factor(30.0), 0.5);
        for lat in (-90..=90).map(f64::from) {
            assert!(wind_factor(lat).abs() <= 0.5);
        }
    }

    #[test]
    fn test_falloff_kernel() {
        assert_eq!(falloff(0.0, 10.0), 1.0);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        assert_eq!(falloff(-40.0, 10.0), 0.0);
        assert!((falloff(2.5, 10.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_decay_is_monotonic_and_bounded() {
        let mut cells = slope(40);
        let params = GenerationParams::default();
        let initial = 0.31;
        let visits = propagate_wind(&mut cells, 0, initial, &params);

        assert!(visits.len() > 1);
        for pair in visits.windows(2) {
            assert_eq!(pair[1].hops, pair[0].hops + 1);
            assert!(pair[1].strength < pair[0].strength);
        }
        let max_hops = visits.iter().map(|v| v.hops).max().unwrap_or(0);
        assert!((max_hops as f64) < initial / params.wind_decrement);
        assert!((cells[0].foehn as f64 - initial).abs() < 1e-6);
    }

    #[test]
    fn test_wind_goes_downwind_only() {
        let mut cells = slope(10);
        let params = GenerationParams::default();
        // Westward gust from the west end has nowhere to go
        let visits = propagate_wind(&mut cells, 0, -0.3, &params);
        assert_eq!(visits.len(), 1);
        // Eastward gust from the east end climbs nothing either
        let visits = propagate_wind(&mut cells, 9, 0.3, &params);
        assert_eq!(visits.len(), 1);
    }

    #[test]
    fn test_wind_stops_at_non_land() {
        let mut cells = slope(10);
        cells[3].cell_type = CellType::InlandLake;
        let visits = propagate_wind(&mut cells, 0, 0.3, &GenerationParams::default());
        assert!(visits.iter().all(|v| v.cell < 3));
    }

    #[test]
    fn test_aridity_non_negative_and_uses_lake_distance() {
        assert_eq!(aridity(0.0, -1.0, 2.0), 0.0);
        assert!(aridity(1.0, 0.0, 1.0) > aridity(0.1, 0.0, 1.0));

        let params = GenerationParams::with_face_size(8.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let (mut cells, _) = generate_mesh(&params, &mut rng).unwrap();
        for c in cells.iter_mut() {
            c.cell_type = CellType::Land;
        }
        cells[0].cell_type = CellType::InlandLake;
        let index = SectionIndex::build(&cells);
        let noise = NoiseField::new(&WorldSeeds::from_master(8));
        assign_aridity(&mut cells, &index, &noise, &params);

        assert_eq!(cells[0].aridity, 0.0);
        assert!(cells.iter().all(|c| c.aridity >= 0.0));
    }
}
