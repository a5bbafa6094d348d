//! Simulation configuration types.
//!
//! Every field the external simulator understands is enumerated here.
//! Optional sections are `Option`s and are left out of the JSON export
//! when absent, so the simulator falls back to its own defaults.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use weft_types::constants::{
    DEFAULT_COLLISION_STIFFNESS, DEFAULT_GRAVITY, DEFAULT_REPULSION_THICKNESS, SNAP_EPSILON,
};
use weft_types::{NodeId, Scalar, WeftError, WeftResult};

/// Complete input for one run of the external simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated time between two output frames (seconds).
    pub frame_time: Scalar,
    /// Solver steps per output frame.
    pub frame_steps: u32,
    /// Simulated duration (seconds).
    pub end_time: Scalar,

    /// Cloth pieces to simulate.
    #[serde(default)]
    pub cloths: Vec<Cloth>,

    /// Gravitational acceleration. Defaults to 9.81 m/s² along +x.
    #[serde(default = "default_gravity", skip_serializing_if = "Option::is_none")]
    pub gravity: Option<[Scalar; 3]>,

    /// Groups of pinned nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<Vec<Handle>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,

    /// Collision tuning.
    #[serde(default)]
    pub magic: Magic,

    /// Simulator stages to switch off (e.g. `"popfilter"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<Vec<String>>,
}

fn default_gravity() -> Option<[Scalar; 3]> {
    Some(DEFAULT_GRAVITY)
}

/// A cloth piece: its initial mesh, placement, materials and remeshing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloth {
    /// Path of the initial mesh file.
    pub mesh: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remeshing: Option<Remesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

/// Rigid placement of a cloth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<[Scalar; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Rotation>,
}

/// Rotation by `angle` degrees about `axis`.
///
/// Serialized as the flat array `[angle, ax, ay, az]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Scalar; 4]", into = "[Scalar; 4]")]
pub struct Rotation {
    pub angle: Scalar,
    pub axis: [Scalar; 3],
}

impl From<[Scalar; 4]> for Rotation {
    fn from([angle, x, y, z]: [Scalar; 4]) -> Self {
        Self {
            angle,
            axis: [x, y, z],
        }
    }
}

impl From<Rotation> for [Scalar; 4] {
    fn from(r: Rotation) -> Self {
        [r.angle, r.axis[0], r.axis[1], r.axis[2]]
    }
}

/// Cloth material reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Path of the simulator's material data file.
    pub data: PathBuf,
    /// Thickness multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thicken: Option<Scalar>,
    /// Allowed stretch range `[min, max]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_limits: Option<[Scalar; 2]>,
}

/// Adaptive remeshing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remesh {
    pub refine_angle: Scalar,
    pub refine_compression: Scalar,
    pub refine_velocity: Scalar,
    /// Edge length range `[min, max]` (meters).
    pub size: [Scalar; 2],
    pub aspect_min: Scalar,
}

/// Pinned node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    /// 0-based node ids.
    pub nodes: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub velocity: [Scalar; 3],
    pub density: Scalar,
    pub drag: Scalar,
}

/// Collision tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magic {
    /// Minimum separation kept between surfaces (meters).
    #[serde(default = "default_repulsion_thickness")]
    pub repulsion_thickness: Scalar,
    #[serde(default = "default_collision_stiffness")]
    pub collision_stiffness: Scalar,
}

fn default_repulsion_thickness() -> Scalar {
    DEFAULT_REPULSION_THICKNESS
}

fn default_collision_stiffness() -> Scalar {
    DEFAULT_COLLISION_STIFFNESS
}

impl Default for Magic {
    fn default() -> Self {
        Self {
            repulsion_thickness: DEFAULT_REPULSION_THICKNESS,
            collision_stiffness: DEFAULT_COLLISION_STIFFNESS,
        }
    }
}

impl SimulationConfig {
    /// A minimal configuration for a single cloth with default physics.
    pub fn new(frame_time: Scalar, frame_steps: u32, end_time: Scalar, mesh: impl Into<PathBuf>) -> Self {
        Self {
            frame_time,
            frame_steps,
            end_time,
            cloths: vec![Cloth {
                mesh: mesh.into(),
                transform: None,
                remeshing: None,
                materials: Vec::new(),
            }],
            gravity: default_gravity(),
            handles: None,
            wind: None,
            magic: Magic::default(),
            disable: None,
        }
    }

    /// Parses a TOML configuration.
    pub fn from_toml_str(text: &str) -> WeftResult<Self> {
        toml::from_str(text).map_err(|e| WeftError::InvalidConfig(e.to_string()))
    }

    /// Parses a configuration in the simulator's JSON layout.
    pub fn from_json_str(text: &str) -> WeftResult<Self> {
        serde_json::from_str(text).map_err(|e| WeftError::InvalidConfig(e.to_string()))
    }

    /// Loads a `.toml` or `.json` configuration file.
    pub fn load(path: impl AsRef<Path>) -> WeftResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    /// The simulator's JSON layout, pretty-printed.
    pub fn to_json(&self) -> WeftResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WeftError::Serialization(e.to_string()))
    }

    /// Writes the JSON export to a temporary `.json` file.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn write_temp(&self) -> WeftResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("weft-config-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(self.to_json()?.as_bytes())?;
        file.flush()?;
        debug!(path = %file.path().display(), "wrote temporary simulator config");
        Ok(file)
    }

    /// Number of output frames the run produces: `floor(end_time / frame_time)`.
    pub fn total_frames(&self) -> u32 {
        if self.frame_time <= 0.0 || !self.end_time.is_finite() {
            return 0;
        }
        (self.end_time / self.frame_time + SNAP_EPSILON).floor().max(0.0) as u32
    }

    /// Sorted, deduplicated node ids of every handle.
    pub fn handle_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .handles
            .iter()
            .flatten()
            .flat_map(|h| h.nodes.iter().copied().map(NodeId))
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}
