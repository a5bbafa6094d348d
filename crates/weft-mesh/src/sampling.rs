//! Poisson-disk sampling of a rectangle.
//!
//! Bridson-style dart throwing, seeded with evenly spaced points along
//! the rectangle border so the resulting cloth has straight edges.
//! The random source is always supplied by the caller: with a seeded
//! generator the point sequence is reproducible bit for bit.

use std::f64::consts::TAU;

use rand::Rng;
use weft_math::DVec2;
use weft_types::constants::SNAP_EPSILON;
use weft_types::{Scalar, WeftError, WeftResult};

/// Poisson-disk sampler over `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonDiskSampler {
    width: Scalar,
    height: Scalar,
    radius: Scalar,
    max_attempts: u32,
}

impl PoissonDiskSampler {
    /// Creates a sampler whose minimum spacing is
    /// `min(width, height) / resolution`.
    pub fn new(width: Scalar, height: Scalar, resolution: u32, max_attempts: u32) -> WeftResult<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(WeftError::InvalidConfig(format!(
                "Sampling domain must be positive, got {width} × {height}"
            )));
        }
        if resolution == 0 {
            return Err(WeftError::InvalidConfig(
                "Sampling resolution must be >= 1".into(),
            ));
        }
        if max_attempts == 0 {
            return Err(WeftError::InvalidConfig(
                "Sampling attempts must be >= 1".into(),
            ));
        }

        Ok(Self {
            width,
            height,
            radius: width.min(height) / resolution as Scalar,
            max_attempts,
        })
    }

    /// Minimum spacing `r` between accepted points.
    #[inline]
    pub fn radius(&self) -> Scalar {
        self.radius
    }

    /// Whether `p` lies in the closed sampling rectangle.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Points every `r` along the four edges, deduplicated and sorted by
    /// `(x, y)`.
    ///
    /// When `r` does not divide an edge length the last step falls short
    /// of the far corner, leaving a slightly irregular border there.
    pub fn border_points(&self) -> Vec<DVec2> {
        let xs = edge_steps(self.width, self.radius);
        let ys = edge_steps(self.height, self.radius);

        let mut points = Vec::with_capacity(2 * (xs.len() + ys.len()));
        for &x in &xs {
            points.push(DVec2::new(x, 0.0));
            points.push(DVec2::new(x, self.height));
        }
        for &y in &ys {
            points.push(DVec2::new(0.0, y));
            points.push(DVec2::new(self.width, y));
        }

        points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        points.dedup();
        points
    }

    /// Runs the sampler.
    ///
    /// Returns the border points first, then the interior seed (if one
    /// fits), then every accepted dart in acceptance order. All returned
    /// points are at least `r` apart, except near an irregular far corner.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<DVec2> {
        let r = self.radius;
        let mut points = self.border_points();
        let mut grid = OccupancyGrid::new(self.width, self.height, r);
        for (i, &p) in points.iter().enumerate() {
            grid.insert(p, i);
        }

        // Interior seed, drawn uniformly among positions that keep the
        // spacing invariant.
        let mut active = Vec::new();
        for _ in 0..self.max_attempts {
            let seed = DVec2::new(
                rng.random_range(0.0..=self.width),
                rng.random_range(0.0..=self.height),
            );
            if grid.is_clear(seed, &points, r) {
                grid.insert(seed, points.len());
                active.push(points.len());
                points.push(seed);
                break;
            }
        }

        while !active.is_empty() {
            let slot = rng.random_range(0..active.len());
            let origin = points[active[slot]];

            let mut found = false;
            for _ in 0..self.max_attempts {
                let angle = rng.random_range(0.0..TAU);
                let distance = rng.random_range(r..2.0 * r);
                let candidate = origin + distance * DVec2::from_angle(angle);

                if !self.contains(candidate) || !grid.is_clear(candidate, &points, r) {
                    continue;
                }
                grid.insert(candidate, points.len());
                active.push(points.len());
                points.push(candidate);
                found = true;
            }

            if !found {
                active.remove(slot);
            }
        }

        points
    }
}

/// Multiples of `step` from 0 up to `length`, snapping onto `length`
/// when the last multiple lands within rounding noise of it.
fn edge_steps(length: Scalar, step: Scalar) -> Vec<Scalar> {
    let count = (length / step + SNAP_EPSILON).floor() as usize;
    (0..=count)
        .map(|k| {
            let v = k as Scalar * step;
            if (length - v).abs() <= SNAP_EPSILON * length {
                length
            } else {
                v.min(length)
            }
        })
        .collect()
}

/// Uniform background grid with cells of size `r`.
///
/// Any point within distance `r` of a query lies in the 3×3 block of
/// cells around it; the search covers 5×5 so that rounding in the cell
/// computation cannot hide a neighbor. The clearance test is exact.
struct OccupancyGrid {
    cell: Scalar,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl OccupancyGrid {
    fn new(width: Scalar, height: Scalar, cell: Scalar) -> Self {
        let cols = (width / cell).floor() as usize + 1;
        let rows = (height / cell).floor() as usize + 1;
        Self {
            cell,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    fn cell_of(&self, p: DVec2) -> (usize, usize) {
        let cx = ((p.x / self.cell).floor().max(0.0) as usize).min(self.cols - 1);
        let cy = ((p.y / self.cell).floor().max(0.0) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: DVec2, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.cells[cy * self.cols + cx].push(index);
    }

    /// `true` if every stored point is farther than `r` from `p`.
    fn is_clear(&self, p: DVec2, points: &[DVec2], r: Scalar) -> bool {
        let (cx, cy) = self.cell_of(p);
        for y in cy.saturating_sub(2)..=(cy + 2).min(self.rows - 1) {
            for x in cx.saturating_sub(2)..=(cx + 2).min(self.cols - 1) {
                for &i in &self.cells[y * self.cols + x] {
                    if points[i].distance(p) <= r {
                        return false;
                    }
                }
            }
        }
        true
    }
}
