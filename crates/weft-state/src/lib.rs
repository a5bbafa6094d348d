//! # weft-state
//!
//! The time series produced by a cloth simulation run.
//!
//! ## Key Types
//!
//! - [`SimulationState`] — Rest vertices, per-frame world positions,
//!   optional velocities, faces and node roles for a fixed topology.
//! - [`NodeRole`] — Whether a node is free or externally constrained.
//! - [`merge()`] — Concatenates two states along the frame axis.
//! - [`append`] — In-place merge that leaves the target intact on error.
//! - [`assign_roles`] — Tags handle nodes.
//! - [`archive`] — Compact binary persistence with `bincode`.

pub mod archive;
pub mod merge;
pub mod state;

pub use merge::{append, assign_roles, merge};
pub use state::{NodeRole, SimulationState};
