//! Simulation state: a deforming mesh sampled at discrete frames.
//!
//! Topology (faces, rest vertices, node count) is fixed for the lifetime
//! of a state; only the frame axis grows, and only through
//! [`crate::merge()`].
//!
//! # Layout
//!
//! World positions are stored frame-major in one flat buffer:
//! ```text
//! nodes: [f0n0, f0n1, ..., f0nN, f1n0, f1n1, ..., f1nN, ...]
//! ```
//! Velocities, when present, share the same layout.

use serde::{Deserialize, Serialize};
use weft_types::{NodeId, Scalar, WeftError, WeftResult};

/// Role of a simulation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeRole {
    /// Free node, moved by the simulation.
    #[default]
    Normal,
    /// Node pinned or driven externally.
    Handle,
}

/// Per-frame world positions over a fixed triangle topology.
///
/// The empty state (no frames, no nodes) is the identity for merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    verts: Vec<[Scalar; 3]>,
    nodes: Vec<[Scalar; 3]>,
    frame_count: usize,
    faces: Vec<[u32; 3]>,
    velocities: Option<Vec<[Scalar; 3]>>,
    node_roles: Option<Vec<NodeRole>>,
}

impl SimulationState {
    /// The empty state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a one-frame state.
    ///
    /// `rest_vertices[i]` and `world_positions[i]` describe the same node.
    ///
    /// # Errors
    /// [`WeftError::InvalidMesh`] if the two sequences differ in length or
    /// are empty, [`WeftError::IndexOutOfRange`] if a face references a
    /// missing node.
    pub fn single_frame(
        rest_vertices: Vec<[Scalar; 3]>,
        world_positions: Vec<[Scalar; 3]>,
        faces: Vec<[u32; 3]>,
    ) -> WeftResult<Self> {
        if rest_vertices.is_empty() {
            return Err(WeftError::InvalidMesh("Frame has no nodes".into()));
        }
        Self::from_parts(rest_vertices, world_positions, 1, faces, None, None)
    }

    /// Assembles a state from raw arrays, checking every shape invariant.
    pub(crate) fn from_parts(
        verts: Vec<[Scalar; 3]>,
        nodes: Vec<[Scalar; 3]>,
        frame_count: usize,
        faces: Vec<[u32; 3]>,
        velocities: Option<Vec<[Scalar; 3]>>,
        node_roles: Option<Vec<NodeRole>>,
    ) -> WeftResult<Self> {
        let n = verts.len();
        if (frame_count == 0) != (n == 0) {
            return Err(WeftError::InvalidMesh(format!(
                "{frame_count} frames over {n} nodes: frames need nodes and nodes need frames"
            )));
        }
        let expected = frame_count.checked_mul(n).ok_or_else(|| {
            WeftError::InvalidMesh(format!("{frame_count} frames × {n} nodes overflows"))
        })?;
        if nodes.len() != expected {
            return Err(WeftError::InvalidMesh(format!(
                "Expected {frame_count} frames × {n} nodes, got {} positions",
                nodes.len()
            )));
        }
        if let Some(v) = &velocities {
            if v.len() != nodes.len() {
                return Err(WeftError::InvalidMesh(format!(
                    "Velocity count ({}) != position count ({})",
                    v.len(),
                    nodes.len()
                )));
            }
        }
        if let Some(roles) = &node_roles {
            if roles.len() != n {
                return Err(WeftError::InvalidMesh(format!(
                    "Role count ({}) != node count ({n})",
                    roles.len()
                )));
            }
        }
        if let Some(&idx) = faces.iter().flatten().find(|&&idx| idx as usize >= n) {
            return Err(WeftError::IndexOutOfRange {
                index: idx as usize,
                count: n,
            });
        }

        Ok(Self {
            verts,
            nodes,
            frame_count,
            faces,
            velocities,
            node_roles,
        })
    }

    /// Attaches velocities, laid out like the world positions.
    pub fn with_velocities(mut self, velocities: Vec<[Scalar; 3]>) -> WeftResult<Self> {
        if velocities.len() != self.nodes.len() {
            return Err(WeftError::InvalidMesh(format!(
                "Velocity count ({}) != position count ({})",
                velocities.len(),
                self.nodes.len()
            )));
        }
        self.velocities = Some(velocities);
        Ok(self)
    }

    /// `true` for the merge identity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of nodes per frame.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.verts.len()
    }

    /// Material-space positions, one per node.
    #[inline]
    pub fn rest_vertices(&self) -> &[[Scalar; 3]] {
        &self.verts
    }

    /// All world positions, frame-major.
    #[inline]
    pub fn world_positions(&self) -> &[[Scalar; 3]] {
        &self.nodes
    }

    /// World positions of frame `f`.
    pub fn frame(&self, f: usize) -> Option<&[[Scalar; 3]]> {
        let n = self.node_count();
        (f < self.frame_count).then(|| &self.nodes[f * n..(f + 1) * n])
    }

    /// Iterates over frames in order.
    pub fn frames(&self) -> impl Iterator<Item = &[[Scalar; 3]]> + '_ {
        // chunks_exact panics on 0, and an empty state has no frames anyway
        let n = self.node_count().max(1);
        self.nodes.chunks_exact(n)
    }

    /// Triangles as node index triples.
    #[inline]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Velocities, frame-major, if every merged frame carried them.
    #[inline]
    pub fn velocities(&self) -> Option<&[[Scalar; 3]]> {
        self.velocities.as_deref()
    }

    /// Per-node roles, if assigned.
    #[inline]
    pub fn node_roles(&self) -> Option<&[NodeRole]> {
        self.node_roles.as_deref()
    }

    /// Ids of nodes tagged [`NodeRole::Handle`].
    pub fn handle_nodes(&self) -> Vec<NodeId> {
        self.node_roles
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, role)| **role == NodeRole::Handle)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    /// Largest distance any node travels from its first-frame position.
    pub fn max_displacement(&self) -> Scalar {
        let Some(first) = self.frame(0) else {
            return 0.0;
        };
        self.frames()
            .flat_map(|frame| frame.iter().zip(first))
            .map(|(p, q)| {
                let d = [p[0] - q[0], p[1] - q[1], p[2] - q[2]];
                (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
            })
            .fold(0.0, Scalar::max)
    }

    pub(crate) fn set_node_roles(&mut self, roles: Option<Vec<NodeRole>>) {
        self.node_roles = roles;
    }

    /// Appends the frames of `other`, whose topology and roles the
    /// caller has already checked against `self`.
    pub(crate) fn extend_frames(&mut self, other: SimulationState) {
        self.velocities = match (self.velocities.take(), other.velocities) {
            (Some(mut va), Some(vb)) => {
                va.extend(vb);
                Some(va)
            }
            _ => None,
        };
        if self.node_roles.is_none() {
            self.node_roles = other.node_roles;
        }
        self.nodes.extend(other.nodes);
        self.frame_count += other.frame_count;
    }
}
