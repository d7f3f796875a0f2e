//! 3D convex hull (quickhull) over points on the unit sphere.
//!
//! For points on a sphere every input point is a hull vertex, so the hull
//! triangles are exactly the spherical Delaunay triangulation of the samples.

use std::collections::{HashMap, HashSet};

use glam::DVec3;

use crate::error::{Result, WorldError};

/// Minimum distance from a face plane for a point to count as outside it.
const EPSILON: f64 = 1e-10;

struct Face {
    v: [usize; 3],
    normal: DVec3,
    offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl Face {
    fn new(points: &[DVec3], v: [usize; 3]) -> Self {
        let (a, b, c) = (points[v[0]], points[v[1]], points[v[2]]);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            v,
            normal,
            offset: normal.dot(a),
            outside: Vec::new(),
            alive: true,
        }
    }

    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [
            (self.v[0], self.v[1]),
            (self.v[1], self.v[2]),
            (self.v[2], self.v[0]),
        ]
    }
}

struct Hull<'a> {
    points: &'a [DVec3],
    faces: Vec<Face>,
    /// Directed edge -> owning face. Every live edge (a, b) has a twin (b, a).
    edges: HashMap<(usize, usize), usize>,
}

impl<'a> Hull<'a> {
    fn add_face(&mut self, v: [usize; 3]) -> usize {
        let id = self.faces.len();
        let face = Face::new(self.points, v);
        for edge in face.edges() {
            self.edges.insert(edge, id);
        }
        self.faces.push(face);
        id
    }

    fn twin(&self, (a, b): (usize, usize)) -> Result<usize> {
        self.edges
            .get(&(b, a))
            .copied()
            .ok_or(WorldError::NonManifold { edge: (a, b), faces: 1 })
    }

    /// Assign `point` to the first face in `candidates` it lies outside of.
    /// Points inside every candidate are interior and dropped.
    fn assign(&mut self, point: usize, candidates: &[usize]) {
        let p = self.points[point];
        for &f in candidates {
            if self.faces[f].distance(p) > EPSILON {
                self.faces[f].outside.push(point);
                return;
            }
        }
    }

    fn initial_simplex(&mut self) -> Result<[usize; 4]> {
        let points = self.points;
        if points.len() < 4 {
            return Err(WorldError::DegenerateHull(format!(
                "need at least 4 points, got {}",
                points.len()
            )));
        }

        let farthest = |score: &dyn Fn(DVec3) -> f64| -> (usize, f64) {
            points
                .iter()
                .enumerate()
                .map(|(i, &p)| (i, score(p)))
                .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best })
        };

        let (i0, _) = farthest(&|p| -p.x);
        let a = points[i0];
        let (i1, d1) = farthest(&|p| (p - a).length());
        if d1 < EPSILON {
            return Err(WorldError::DegenerateHull("all points coincide".into()));
        }
        let dir = (points[i1] - a) / d1;
        let (i2, d2) = farthest(&|p| (p - a).cross(dir).length());
        if d2 < EPSILON {
            return Err(WorldError::DegenerateHull("points are collinear".into()));
        }
        let plane = (points[i1] - a).cross(points[i2] - a).normalize();
        let (i3, d3) = farthest(&|p| (p - a).dot(plane).abs());
        if d3 < EPSILON {
            return Err(WorldError::DegenerateHull("points are coplanar".into()));
        }

        let simplex = [i0, i1, i2, i3];
        for (tri, opposite) in [
            ([i0, i1, i2], i3),
            ([i0, i1, i3], i2),
            ([i0, i2, i3], i1),
            ([i1, i2, i3], i0),
        ] {
            let mut v = tri;
            if Face::new(points, v).distance(points[opposite]) > 0.0 {
                v.swap(1, 2);
            }
            self.add_face(v);
        }
        Ok(simplex)
    }

    fn build(mut self) -> Result<Vec<[usize; 3]>> {
        let simplex = self.initial_simplex()?;
        let initial: Vec<usize> = (0..self.faces.len()).collect();
        for i in 0..self.points.len() {
            if !simplex.contains(&i) {
                self.assign(i, &initial);
            }
        }

        let mut pending: Vec<usize> = initial
            .into_iter()
            .filter(|&f| !self.faces[f].outside.is_empty())
            .collect();

        while let Some(fi) = pending.pop() {
            if !self.faces[fi].alive || self.faces[fi].outside.is_empty() {
                continue;
            }

            // Farthest outside point becomes the next hull vertex
            let eye = {
                let face = &self.faces[fi];
                let mut best = face.outside[0];
                let mut best_d = f64::MIN;
                for &p in &face.outside {
                    let d = face.distance(self.points[p]);
                    if d > best_d {
                        best_d = d;
                        best = p;
                    }
                }
                best
            };
            let eye_p = self.points[eye];

            // Faces visible from the eye, and the horizon bounding them
            let mut visible = vec![fi];
            let mut visible_set = HashSet::from([fi]);
            let mut horizon = Vec::new();
            let mut stack = vec![fi];
            while let Some(f) = stack.pop() {
                for edge in self.faces[f].edges() {
                    let g = self.twin(edge)?;
                    if visible_set.contains(&g) {
                        continue;
                    }
                    if self.faces[g].distance(eye_p) > EPSILON {
                        visible_set.insert(g);
                        visible.push(g);
                        stack.push(g);
                    } else {
                        horizon.push(edge);
                    }
                }
            }

            let mut orphans = Vec::new();
            for &f in &visible {
                let face = &mut self.faces[f];
                face.alive = false;
                orphans.extend(face.outside.drain(..).filter(|&p| p != eye));
                for edge in face.edges() {
                    if self.edges.get(&edge) == Some(&f) {
                        self.edges.remove(&edge);
                    }
                }
            }

            let new_faces: Vec<usize> = horizon
                .into_iter()
                .map(|(a, b)| self.add_face([a, b, eye]))
                .collect();

            for p in orphans {
                self.assign(p, &new_faces);
            }
            pending.extend(
                new_faces
                    .into_iter()
                    .filter(|&f| !self.faces[f].outside.is_empty()),
            );
        }

        Ok(self
            .faces
            .into_iter()
            .filter(|f| f.alive)
            .map(|f| f.v)
            .collect())
    }
}

/// Triangles of the convex hull of `points`, as index triples wound
/// counter-clockwise when seen from outside.
pub fn convex_hull(points: &[DVec3]) -> Result<Vec<[usize; 3]>> {
    Hull {
        points,
        faces: Vec::new(),
        edges: HashMap::new(),
    }
    .build()
}
