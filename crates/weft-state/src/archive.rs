//! Binary persistence for simulation states.
//!
//! A state is stored as a single `bincode` record holding named arrays,
//! so loading a saved state gives back an identical state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use weft_types::{Scalar, WeftError, WeftResult};

use crate::state::{NodeRole, SimulationState};

/// Archive layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk record of a [`SimulationState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateArchive {
    pub format_version: u32,
    pub frame_count: u64,
    pub node_count: u64,
    /// Rest (material-space) vertices.
    pub verts: Vec<[Scalar; 3]>,
    /// World positions, frame-major.
    pub nodes: Vec<[Scalar; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub node_role: Option<Vec<NodeRole>>,
    pub velocities: Option<Vec<[Scalar; 3]>>,
}

impl StateArchive {
    /// Captures `state`.
    pub fn from_state(state: &SimulationState) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            frame_count: state.frame_count() as u64,
            node_count: state.node_count() as u64,
            verts: state.rest_vertices().to_vec(),
            nodes: state.world_positions().to_vec(),
            faces: state.faces().to_vec(),
            node_role: state.node_roles().map(<[NodeRole]>::to_vec),
            velocities: state.velocities().map(<[[Scalar; 3]]>::to_vec),
        }
    }

    /// Rebuilds the state, checking the version and every array shape.
    pub fn into_state(self) -> WeftResult<SimulationState> {
        if self.format_version != FORMAT_VERSION {
            return Err(WeftError::Serialization(format!(
                "Unsupported archive version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.node_count != self.verts.len() as u64 {
            return Err(WeftError::Serialization(format!(
                "Archive declares {} nodes but stores {}",
                self.node_count,
                self.verts.len()
            )));
        }
        let frame_count = usize::try_from(self.frame_count).map_err(|_| {
            WeftError::Serialization(format!(
                "Archive frame count {} exceeds this platform's limit",
                self.frame_count
            ))
        })?;
        SimulationState::from_parts(
            self.verts,
            self.nodes,
            frame_count,
            self.faces,
            self.velocities,
            self.node_role,
        )
        .map_err(|e| WeftError::Serialization(format!("Corrupt archive: {e}")))
    }
}

/// Serializes `state` to compact binary form.
pub fn to_bytes(state: &SimulationState) -> WeftResult<Vec<u8>> {
    bincode::serialize(&StateArchive::from_state(state))
        .map_err(|e| WeftError::Serialization(format!("Archive serialization failed: {e}")))
}

/// Deserializes a state written by [`to_bytes`].
pub fn from_bytes(data: &[u8]) -> WeftResult<SimulationState> {
    let archive: StateArchive = bincode::deserialize(data)
        .map_err(|e| WeftError::Serialization(format!("Archive deserialization failed: {e}")))?;
    archive.into_state()
}

/// Writes `state` to `path`.
pub fn save(state: &SimulationState, path: impl AsRef<Path>) -> WeftResult<()> {
    let path = path.as_ref();
    let bytes = to_bytes(state)?;
    fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        frames = state.frame_count(),
        nodes = state.node_count(),
        bytes = bytes.len(),
        "saved state archive"
    );
    Ok(())
}

/// Reads a state from `path`.
pub fn load(path: impl AsRef<Path>) -> WeftResult<SimulationState> {
    let bytes = fs::read(path)?;
    from_bytes(&bytes)
}
