//! # weft-math
//!
//! Planar geometry for the weft pipeline.
//!
//! Provides:
//! - Re-exports of the `glam` double-precision types used across weft
//! - Orientation and in-circle predicates
//! - Incremental Delaunay triangulation of 2D point sets

pub mod delaunay;
pub mod predicates;

// Re-export glam types as the canonical math types for weft.
pub use glam::{DVec2, DVec3};

pub use delaunay::triangulate;
