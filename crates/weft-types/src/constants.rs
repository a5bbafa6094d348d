//! Pipeline defaults.

/// Default number of candidate darts thrown around each active point
/// during Poisson-disk sampling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default distance threshold for mapping a world point onto a mesh vertex.
pub const DEFAULT_HANDLE_THRESHOLD: f64 = 0.1;

/// Default gravity vector handed to the external simulator (m/s²).
pub const DEFAULT_GRAVITY: [f64; 3] = [9.81, 0.0, 0.0];

/// Default repulsion thickness for the external simulator (meters).
pub const DEFAULT_REPULSION_THICKNESS: f64 = 10e-3;

/// Default collision stiffness for the external simulator.
pub const DEFAULT_COLLISION_STIFFNESS: f64 = 1e6;

/// Relative tolerance used to snap generated coordinates onto domain edges.
pub const SNAP_EPSILON: f64 = 1.0e-9;
