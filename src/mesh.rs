//! Mesh construction: jittered sphere sampling, hull triangulation and
//! shared-edge adjacency.

use std::collections::HashMap;

use glam::DVec3;
use rand::Rng;

use crate::cell::Cell;
use crate::coords::{lon_scale, normalize_lon, Spherical};
use crate::error::{Result, WorldError};
use crate::hull::convex_hull;
use crate::params::GenerationParams;

/// Number of triangles in the hull of `n` points in convex position.
pub fn expected_face_count(n: usize) -> usize {
    (2 * n).saturating_sub(4)
}

/// Sample a quasi-uniform jittered point set on the sphere.
///
/// Latitude bands are `face_size` degrees apart. Within a band the longitude
/// step is stretched by `1 / sin(lat)` so the surface density stays roughly
/// constant. Each sample is jittered by up to half a face size on both axes.
/// The two poles are always included.
pub fn sample_sphere_points<R: Rng>(params: &GenerationParams, rng: &mut R) -> Vec<Spherical> {
    let size = params.face_size;
    let bands = ((180.0 - size) / size).floor() as usize;
    let mut points = Vec::new();

    for band in 1..=bands {
        let lat = band as f64 * size;
        let step = lon_scale(lat) * size;
        let mut lon = size;
        while lon < 360.0 {
            let jitter_lon = rng.gen::<f64>() * (size / 2.0);
            let jitter_lat = rng.gen::<f64>() * (size / 2.0);
            points.push(Spherical::new(normalize_lon(lon + jitter_lon), lat + jitter_lat));
            lon += step;
        }
    }

    points.push(Spherical::new(0.0, 0.0));
    points.push(Spherical::new(0.0, 180.0));
    points
}

/// Rotate a triangle so the vertex with the smallest longitude comes first,
/// keeping the winding order.
fn canonical_order(tri: [usize; 3], points: &[Spherical]) -> [usize; 3] {
    let [a, b, c] = tri;
    let (la, lb, lc) = (points[a].lon, points[b].lon, points[c].lon);
    if la <= lb && la <= lc {
        [a, b, c]
    } else if lb <= la && lb <= lc {
        [b, c, a]
    } else {
        [c, a, b]
    }
}

/// Build cells from the hull of `points` and link cells sharing an edge.
pub fn build_mesh(points: &[Spherical]) -> Result<Vec<Cell>> {
    let units: Vec<DVec3> = points.iter().map(|p| p.to_unit()).collect();
    let triangles = convex_hull(&units)?;

    let mut cells = Vec::with_capacity(triangles.len());
    let mut edge_map: HashMap<(usize, usize), Vec<usize>> = HashMap::with_capacity(triangles.len() * 3 / 2);

    for tri in triangles {
        let [a, b, c] = canonical_order(tri, points);
        let id = cells.len();
        for (u, v) in [(a, b), (b, c), (c, a)] {
            edge_map.entry((u.min(v), u.max(v))).or_default().push(id);
        }
        cells.push(Cell::new(points[a], points[b], points[c]));
    }

    for (edge, faces) in edge_map {
        if faces.len() != 2 {
            return Err(WorldError::NonManifold {
                edge,
                faces: faces.len(),
            });
        }
        let (f, g) = (faces[0], faces[1]);
        cells[f].neighbors.push(g);
        cells[g].neighbors.push(f);
    }

    // Sort for a deterministic neighbor order independent of hash iteration
    for cell in &mut cells {
        cell.neighbors.sort_unstable();
    }

    Ok(cells)
}

/// Sample points and build the world mesh. Returns the cells and the number
/// of sampled points.
pub fn generate_mesh<R: Rng>(params: &GenerationParams, rng: &mut R) -> Result<(Vec<Cell>, usize)> {
    let points = sample_sphere_points(params, rng);
    let sample_count = points.len();
    let cells = build_mesh(&points)?;
    Ok((cells, sample_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn coarse_mesh(seed: u64) -> (Vec<Cell>, usize) {
        let params = GenerationParams::with_face_size(10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_mesh(&params, &mut rng).unwrap()
    }

    #[test]
    fn test_sampling_includes_poles_and_stays_in_range() {
        let params = GenerationParams::with_face_size(10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = sample_sphere_points(&params, &mut rng);
        assert!(points.contains(&Spherical::new(0.0, 0.0)));
        assert!(points.contains(&Spherical::new(0.0, 180.0)));
        for p in &points {
            assert!((0.0..360.0).contains(&p.lon));
            assert!((0.0..=180.0).contains(&p.lat));
        }
    }

    #[test]
    fn test_mesh_is_closed_manifold() {
        let (cells, n) = coarse_mesh(7);
        assert_eq!(cells.len(), expected_face_count(n));

        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.neighbors.len(), 3, "cell {} has {:?}", i, cell.neighbors);
            for &nb in &cell.neighbors {
                assert_ne!(nb, i);
                assert!(cells[nb].neighbors.contains(&i), "asymmetric link {} -> {}", i, nb);
            }
        }

        // Euler characteristic V - E + F = 2
        let faces = cells.len() as i64;
        let edges = faces * 3 / 2;
        assert_eq!(n as i64 - edges + faces, 2);
    }

    #[test]
    fn test_first_vertex_has_smallest_longitude() {
        let (cells, _) = coarse_mesh(3);
        for cell in &cells {
            let [a, b, c] = cell.vertices();
            assert!(a.lon <= b.lon && a.lon <= c.lon);
        }
    }

    #[test]
    fn test_same_seed_same_mesh() {
        let (a, _) = coarse_mesh(99);
        let (b, _) = coarse_mesh(99);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.vertices(), y.vertices());
            assert_eq!(x.neighbors, y.neighbors);
        }
    }
}
