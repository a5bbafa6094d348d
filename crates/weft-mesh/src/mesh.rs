//! Core triangle mesh type with SoA (Structure of Arrays) layout.
//!
//! The SoA layout stores each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! Vertex order is vertex identity: the external simulator addresses
//! nodes by their position in this sequence, so nothing here reorders it.

use serde::{Deserialize, Serialize};
use weft_math::{DVec2, DVec3};
use weft_types::{NodeId, Scalar, WeftError, WeftResult};

/// A static triangle mesh stored in Structure-of-Arrays layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    // --- Vertex data (SoA) ---
    /// X coordinates of all vertices.
    pub pos_x: Vec<Scalar>,
    /// Y coordinates of all vertices.
    pub pos_y: Vec<Scalar>,
    /// Z coordinates of all vertices.
    pub pos_z: Vec<Scalar>,

    // --- Triangle data ---
    /// Triangle indices. Each triangle is [v0, v1, v2], 0-based.
    /// Stored flat: `[t0v0, t0v1, t0v2, t1v0, t1v1, t1v2, ...]`
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position of vertex `i` as `[x, y, z]`.
    #[inline]
    pub fn position(&self, i: usize) -> [Scalar; 3] {
        [self.pos_x[i], self.pos_y[i], self.pos_z[i]]
    }

    /// Returns the position as a `glam::DVec3`.
    #[inline]
    pub fn position_vec3(&self, i: usize) -> DVec3 {
        DVec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        let base = t * 3;
        [self.indices[base], self.indices[base + 1], self.indices[base + 2]]
    }

    /// Iterates over all triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// Appends a vertex.
    #[inline]
    pub fn push_vertex(&mut self, [x, y, z]: [Scalar; 3]) {
        self.pos_x.push(x);
        self.pos_y.push(y);
        self.pos_z.push(z);
    }

    /// Appends a triangle.
    #[inline]
    pub fn push_triangle(&mut self, tri: [u32; 3]) {
        self.indices.extend_from_slice(&tri);
    }

    /// Lifts a planar triangulation into 3D at `z = 0`.
    pub fn from_planar(points: &[DVec2], faces: &[[u32; 3]]) -> Self {
        let mut mesh = Self::with_capacity(points.len(), faces.len());
        for p in points {
            mesh.push_vertex([p.x, p.y, 0.0]);
        }
        for &f in faces {
            mesh.push_triangle(f);
        }
        mesh
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All SoA arrays have the same length
    /// - Index count is a multiple of 3
    /// - Triangle indices are within bounds
    /// - No degenerate triangles (repeated vertex indices)
    pub fn validate(&self) -> WeftResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(WeftError::InvalidMesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }

        if self.indices.len() % 3 != 0 {
            return Err(WeftError::InvalidMesh(
                "Index count is not divisible by 3".into(),
            ));
        }

        if let Some(&idx) = self.indices.iter().find(|&&idx| idx as usize >= n) {
            return Err(WeftError::IndexOutOfRange {
                index: idx as usize,
                count: n,
            });
        }

        for (t, [a, b, c]) in self.triangles().enumerate() {
            if a == b || b == c || a == c {
                return Err(WeftError::InvalidMesh(format!(
                    "Triangle {t} has repeated vertex indices: [{a}, {b}, {c}]"
                )));
            }
        }

        Ok(())
    }

    /// Vertices that no triangle references.
    pub fn orphan_vertices(&self) -> Vec<usize> {
        let mut used = vec![false; self.vertex_count()];
        for &idx in &self.indices {
            if let Some(u) = used.get_mut(idx as usize) {
                *u = true;
            }
        }
        (0..used.len()).filter(|&i| !used[i]).collect()
    }

    /// Maps world-space points onto the nearest mesh vertices.
    ///
    /// For each query point, returns the id of the closest vertex by
    /// Euclidean distance, or `None` if that distance is `>= threshold`
    /// (or the mesh has no vertices). Used to turn user-picked
    /// coordinates into handle node ids.
    pub fn find_nearest_vertices(&self, points: &[DVec3], threshold: Scalar) -> Vec<Option<NodeId>> {
        points
            .iter()
            .map(|&q| {
                (0..self.vertex_count())
                    .map(|i| (i, self.position_vec3(i).distance(q)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .filter(|&(_, d)| d < threshold)
                    .map(|(i, _)| NodeId(i as u32))
            })
            .collect()
    }

    /// Axis-aligned bounding box `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        (0..self.vertex_count()).map(|i| self.position_vec3(i)).fold(None, |acc, p| {
            Some(match acc {
                None => (p, p),
                Some((lo, hi)) => (lo.min(p), hi.max(p)),
            })
        })
    }
}
