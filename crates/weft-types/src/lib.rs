//! # weft-types
//!
//! Shared types, identifiers, error types, and defaults for the weft
//! cloth-simulation pipeline.
//!
//! This crate has zero domain logic — it defines the vocabulary
//! that all other weft crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{WeftError, WeftResult};
pub use ids::NodeId;
pub use scalar::Scalar;
