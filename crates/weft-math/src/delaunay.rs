//! Incremental Delaunay triangulation (Bowyer–Watson).
//!
//! Points are inserted one at a time into a triangulation seeded with a
//! large super-triangle. For each point the cavity of triangles whose
//! circumcircle contains it is removed and re-filled with a fan around
//! the new point.
//!
//! Generated cloth meshes are full of exact ties: border points are
//! collinear and grid points are cocircular. Ties are resolved as
//! "outside" by error-bounded predicates, the cavity is grown from the
//! triangle that contains the point, and it is then widened until every
//! boundary edge sees the point strictly on its left. The fan built over
//! such a cavity is always a valid triangulation.

use std::collections::{BTreeSet, HashMap, VecDeque};

use glam::DVec2;
use tracing::debug;
use weft_types::{WeftError, WeftResult};

use crate::predicates::{is_strictly_in_circle, is_strictly_left, orient2d};

/// Super-triangle half-size, in multiples of the point set extent.
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Triangulates a 2D point set.
///
/// Returns counter-clockwise triangles as triples of indices into
/// `points`. Insertion follows input order, so the result is a pure
/// function of the input.
///
/// # Errors
/// [`WeftError::DegenerateSampling`] if there are fewer than 3 points,
/// a non-finite or duplicated point, or if all points are collinear.
pub fn triangulate(points: &[DVec2]) -> WeftResult<Vec<[u32; 3]>> {
    if points.len() < 3 {
        return Err(WeftError::DegenerateSampling(format!(
            "at least 3 points are required, got {}",
            points.len()
        )));
    }
    check_distinct(points)?;

    let mut mesh = Triangulation::new(points);
    for i in 0..points.len() {
        mesh.insert(i)?;
    }

    let faces = mesh.finish();
    if faces.is_empty() {
        return Err(WeftError::DegenerateSampling(format!(
            "all {} points are collinear",
            points.len()
        )));
    }

    debug!(points = points.len(), triangles = faces.len(), "delaunay triangulation");
    Ok(faces)
}

/// Rejects non-finite and duplicated points.
fn check_distinct(points: &[DVec2]) -> WeftResult<()> {
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(WeftError::DegenerateSampling(format!(
            "point {i} is not finite: {:?}",
            points[i]
        )));
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .total_cmp(&points[j].x)
            .then(points[i].y.total_cmp(&points[j].y))
    });
    for pair in order.windows(2) {
        if points[pair[0]] == points[pair[1]] {
            return Err(WeftError::DegenerateSampling(format!(
                "points {} and {} coincide at {:?}",
                pair[0], pair[1], points[pair[0]]
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    /// Vertex indices, counter-clockwise.
    v: [usize; 3],
    /// `n[i]` is the triangle across the edge opposite `v[i]`.
    n: [Option<usize>; 3],
    alive: bool,
}

impl Triangle {
    /// Directed edge opposite `v[i]`, oriented counter-clockwise.
    #[inline]
    fn edge(&self, i: usize) -> (usize, usize) {
        (self.v[(i + 1) % 3], self.v[(i + 2) % 3])
    }
}

/// A cavity boundary edge `a → b` and the surviving triangle beyond it.
#[derive(Debug, Clone, Copy)]
struct BoundaryEdge {
    a: usize,
    b: usize,
    outer: Option<usize>,
}

struct Triangulation {
    /// Input points followed by the three super-triangle vertices.
    coords: Vec<DVec2>,
    real_count: usize,
    triangles: Vec<Triangle>,
    /// Most recently created triangle; starting point for point location.
    last: usize,
}

impl Triangulation {
    fn new(points: &[DVec2]) -> Self {
        let (min, max) = points.iter().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), &p| (lo.min(p), hi.max(p)),
        );
        let center = (min + max) * 0.5;
        let extent = (max - min).max_element().max(f64::MIN_POSITIVE);
        let s = SUPER_TRIANGLE_SCALE * extent;

        let real_count = points.len();
        let mut coords = Vec::with_capacity(real_count + 3);
        coords.extend_from_slice(points);
        coords.push(center + DVec2::new(-s, -s));
        coords.push(center + DVec2::new(s, -s));
        coords.push(center + DVec2::new(0.0, s));

        let root = Triangle {
            v: [real_count, real_count + 1, real_count + 2],
            n: [None; 3],
            alive: true,
        };

        Self {
            coords,
            real_count,
            triangles: vec![root],
            last: 0,
        }
    }

    fn insert(&mut self, pi: usize) -> WeftResult<()> {
        let p = self.coords[pi];
        let start = self.locate(p).ok_or_else(|| {
            WeftError::DegenerateSampling(format!("point {pi} at {p:?} could not be located"))
        })?;

        // Grow the Delaunay cavity from the containing triangle.
        let mut cavity = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(t) = queue.pop_front() {
            for nb in self.triangles[t].n.into_iter().flatten() {
                if !cavity.contains(&nb) && self.circumcircle_contains(nb, p) {
                    cavity.insert(nb);
                    queue.push_back(nb);
                }
            }
        }

        // Widen it until it is star-shaped around `p`.
        loop {
            let hidden = self
                .boundary(&cavity)
                .into_iter()
                .find(|e| !is_strictly_left(self.coords[e.a], self.coords[e.b], p));
            match hidden {
                None => break,
                Some(BoundaryEdge { outer: Some(nb), .. }) => {
                    cavity.insert(nb);
                }
                Some(BoundaryEdge { outer: None, .. }) => {
                    return Err(WeftError::DegenerateSampling(format!(
                        "point {pi} at {p:?} lies on the super-triangle boundary"
                    )));
                }
            }
        }

        let boundary = self.boundary(&cavity);
        let mut free_slots: Vec<usize> = cavity.iter().rev().copied().collect();
        for &t in &cavity {
            self.triangles[t].alive = false;
        }

        let mut created = Vec::with_capacity(boundary.len());
        let mut by_start = HashMap::with_capacity(boundary.len());
        let mut by_end = HashMap::with_capacity(boundary.len());
        for edge in &boundary {
            let tri = Triangle {
                v: [edge.a, edge.b, pi],
                n: [None, None, edge.outer],
                alive: true,
            };
            let id = match free_slots.pop() {
                Some(slot) => {
                    self.triangles[slot] = tri;
                    slot
                }
                None => {
                    self.triangles.push(tri);
                    self.triangles.len() - 1
                }
            };
            if let Some(outer) = edge.outer {
                self.relink(outer, edge.a, edge.b, id);
            }
            by_start.insert(edge.a, id);
            by_end.insert(edge.b, id);
            created.push(id);
        }

        // Fan triangles share the spokes to `p` with their neighbors.
        for &id in &created {
            let [a, b, _] = self.triangles[id].v;
            self.triangles[id].n[0] = by_start.get(&b).copied();
            self.triangles[id].n[1] = by_end.get(&a).copied();
        }

        if let Some(&id) = created.last() {
            self.last = id;
        }
        Ok(())
    }

    /// Finds a live triangle containing `p` (boundary inclusive).
    ///
    /// Walks from the last created triangle towards `p`, falling back to a
    /// linear scan if the walk does not settle.
    fn locate(&self, p: DVec2) -> Option<usize> {
        let mut t = self.last;
        'walk: for _ in 0..self.triangles.len() {
            let tri = &self.triangles[t];
            if !tri.alive {
                break;
            }
            for i in 0..3 {
                let (a, b) = tri.edge(i);
                if orient2d(self.coords[a], self.coords[b], p) < 0.0 {
                    match tri.n[i] {
                        Some(nb) => {
                            t = nb;
                            continue 'walk;
                        }
                        None => break 'walk,
                    }
                }
            }
            return Some(t);
        }

        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.alive)
            .find(|(_, tri)| (0..3).all(|i| {
                let (a, b) = tri.edge(i);
                orient2d(self.coords[a], self.coords[b], p) >= 0.0
            }))
            .map(|(t, _)| t)
    }

    fn circumcircle_contains(&self, t: usize, p: DVec2) -> bool {
        let [a, b, c] = self.triangles[t].v;
        is_strictly_in_circle(self.coords[a], self.coords[b], self.coords[c], p)
    }

    /// Edges of the cavity whose other side is not part of the cavity.
    fn boundary(&self, cavity: &BTreeSet<usize>) -> Vec<BoundaryEdge> {
        let mut edges = Vec::new();
        for &t in cavity {
            let tri = &self.triangles[t];
            for i in 0..3 {
                let outer = tri.n[i];
                if outer.is_some_and(|o| cavity.contains(&o)) {
                    continue;
                }
                let (a, b) = tri.edge(i);
                edges.push(BoundaryEdge { a, b, outer });
            }
        }
        edges
    }

    /// Points the neighbor slot of `outer` across edge `b → a` at `new`.
    fn relink(&mut self, outer: usize, a: usize, b: usize, new: usize) {
        let tri = &mut self.triangles[outer];
        for k in 0..3 {
            if tri.v[(k + 1) % 3] == b && tri.v[(k + 2) % 3] == a {
                tri.n[k] = Some(new);
                return;
            }
        }
    }

    /// Live triangles that do not touch the super-triangle.
    fn finish(self) -> Vec<[u32; 3]> {
        let real = self.real_count;
        self.triangles
            .into_iter()
            .filter(|t| t.alive && t.v.iter().all(|&v| v < real))
            .map(|t| [t.v[0] as u32, t.v[1] as u32, t.v[2] as u32])
            .collect()
    }
}
