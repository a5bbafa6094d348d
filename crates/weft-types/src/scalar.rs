//! Scalar type alias for geometry and simulation data.
//!
//! The external simulator writes its exports in double precision, and the
//! Delaunay predicates need the extra mantissa, so everything is `f64`.

/// The floating-point type used throughout the pipeline.
pub type Scalar = f64;
