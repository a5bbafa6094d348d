//! # weft-config
//!
//! Configuration of an external simulator run.
//!
//! Defines the boundary types the CLI and the runner use to describe a
//! simulation: timing, cloths and their materials, handles, wind and
//! solver tuning. Users write TOML; the simulator reads the JSON export.

pub mod config;
pub mod validator;

pub use config::{Cloth, Handle, Magic, Material, Remesh, Rotation, SimulationConfig, Transform, Wind};
pub use validator::validate_config;
