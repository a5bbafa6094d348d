//! # weft-mesh
//!
//! Triangle mesh representation with Structure-of-Arrays (SoA) layout,
//! plus the procedural generators that build the initial cloth handed
//! to the external simulator.
//!
//! ## Key Types
//!
//! - [`TriangleMesh`] — The static mesh type. Stores positions in
//!   contiguous SoA buffers and triangles as a flat index list.
//! - [`sampling::PoissonDiskSampler`] — Bridson-style dart throwing over a
//!   rectangle with a seeded border.
//! - Procedural generators for planar cloth (Poisson-disk, regular grid).
//! - [`obj`] — The plain `v` / `f` mesh text format.

pub mod generators;
pub mod mesh;
pub mod obj;
pub mod sampling;

pub use mesh::TriangleMesh;
