//! Procedural planar cloth generators.
//!
//! Both generators produce a flat rectangle at `z = 0` spanning
//! `[0, width] × [0, height]`, triangulated with Delaunay. The result is
//! written out with [`crate::obj`] and handed to the external simulator
//! as the initial cloth.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use weft_math::{triangulate, DVec2};
use weft_types::constants::SNAP_EPSILON;
use weft_types::{Scalar, WeftError, WeftResult};

use crate::mesh::TriangleMesh;
use crate::sampling::PoissonDiskSampler;

/// Generates a quasi-uniform random plane mesh.
///
/// Points are Poisson-disk sampled with minimum spacing
/// `min(width, height) / resolution` (see [`PoissonDiskSampler`]) and
/// Delaunay-triangulated.
///
/// # Arguments
/// - `width`, `height` — Rectangle size in meters.
/// - `resolution` — Number of spacing steps along the shorter side.
/// - `max_attempts` — Darts thrown around each active point
///   ([`weft_types::constants::DEFAULT_MAX_ATTEMPTS`] is the usual choice).
/// - `rng` — Random source. Pass a seeded generator for reproducible meshes.
///
/// # Errors
/// [`WeftError::InvalidConfig`] for non-positive parameters,
/// [`WeftError::DegenerateSampling`] if the points cannot be triangulated.
pub fn poisson_disk_plane<R: Rng + ?Sized>(
    width: Scalar,
    height: Scalar,
    resolution: u32,
    max_attempts: u32,
    rng: &mut R,
) -> WeftResult<TriangleMesh> {
    let sampler = PoissonDiskSampler::new(width, height, resolution, max_attempts)?;
    let points = sampler.sample(rng);
    let faces = triangulate(&points)?;

    debug!(
        radius = sampler.radius(),
        vertices = points.len(),
        triangles = faces.len(),
        "generated poisson-disk plane"
    );
    Ok(TriangleMesh::from_planar(&points, &faces))
}

/// [`poisson_disk_plane`] driven by a ChaCha generator seeded with `seed`.
///
/// The same seed always yields the same mesh, on every platform.
pub fn poisson_disk_plane_seeded(
    width: Scalar,
    height: Scalar,
    resolution: u32,
    max_attempts: u32,
    seed: u64,
) -> WeftResult<TriangleMesh> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    poisson_disk_plane(width, height, resolution, max_attempts, &mut rng)
}

/// Regular lattice of `floor(width/spacing)+1` × `floor(height/spacing)+1`
/// points spanning the rectangle, in x-major order.
///
/// Coordinates are linearly spaced between the rectangle edges, so the
/// actual spacing is stretched slightly when `spacing` does not divide
/// the size.
///
/// # Example
/// ```
/// use weft_mesh::generators::lattice_points;
/// let points = lattice_points(1.0, 1.0, 0.5).unwrap();
/// assert_eq!(points.len(), 9); // 3×3 lattice
/// ```
pub fn lattice_points(width: Scalar, height: Scalar, spacing: Scalar) -> WeftResult<Vec<DVec2>> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "Grid domain must be positive, got {width} × {height}"
        )));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(WeftError::InvalidConfig(format!(
            "Grid spacing must be positive, got {spacing}"
        )));
    }

    let nx = (width / spacing + SNAP_EPSILON).floor() as usize + 1;
    let ny = (height / spacing + SNAP_EPSILON).floor() as usize + 1;

    let mut points = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            points.push(DVec2::new(linspace(width, nx, i), linspace(height, ny, j)));
        }
    }
    Ok(points)
}

/// Generates a regular grid plane mesh.
///
/// Fully deterministic. Each lattice square is split into two triangles
/// by the Delaunay triangulation.
///
/// # Example
/// ```
/// use weft_mesh::generators::uniform_grid_plane;
/// let mesh = uniform_grid_plane(1.0, 1.0, 0.5).unwrap();
/// assert_eq!(mesh.vertex_count(), 9);   // 3×3 vertices
/// assert_eq!(mesh.triangle_count(), 8); // 2×2 squares × 2 tris each
/// ```
pub fn uniform_grid_plane(width: Scalar, height: Scalar, spacing: Scalar) -> WeftResult<TriangleMesh> {
    let points = lattice_points(width, height, spacing)?;
    let faces = triangulate(&points)?;

    debug!(
        spacing,
        vertices = points.len(),
        triangles = faces.len(),
        "generated grid plane"
    );
    Ok(TriangleMesh::from_planar(&points, &faces))
}

/// `i`-th of `n` evenly spaced values over `[0, length]`.
#[inline]
fn linspace(length: Scalar, n: usize, i: usize) -> Scalar {
    if n < 2 {
        0.0
    } else if i == n - 1 {
        length
    } else {
        length * i as Scalar / (n - 1) as Scalar
    }
}
