//! Integration tests for weft-math.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use weft_math::predicates::{in_circle, is_strictly_in_circle, is_strictly_left, orient2d};
use weft_math::{triangulate, DVec2};
use weft_types::WeftError;

fn area2(points: &[DVec2], t: [u32; 3]) -> f64 {
    orient2d(
        points[t[0] as usize],
        points[t[1] as usize],
        points[t[2] as usize],
    )
}

/// No input point lies strictly inside any triangle's circumcircle.
fn assert_delaunay(points: &[DVec2], faces: &[[u32; 3]]) {
    for &t in faces {
        let [a, b, c] = t.map(|i| points[i as usize]);
        for (i, &p) in points.iter().enumerate() {
            if t.contains(&(i as u32)) {
                continue;
            }
            assert!(
                !is_strictly_in_circle(a, b, c, p),
                "point {i} inside circumcircle of {t:?}"
            );
        }
    }
}

fn grid(nx: usize, ny: usize, spacing: f64) -> Vec<DVec2> {
    let mut points = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            points.push(DVec2::new(i as f64 * spacing, j as f64 * spacing));
        }
    }
    points
}

// ─── Predicate Tests ──────────────────────────────────────────

#[test]
fn orient_signs() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    assert!(orient2d(a, b, DVec2::new(0.0, 1.0)) > 0.0);
    assert!(orient2d(a, b, DVec2::new(0.0, -1.0)) < 0.0);
    assert_eq!(orient2d(a, b, DVec2::new(2.0, 0.0)), 0.0);
}

#[test]
fn strictly_left_rejects_collinear() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(0.1, 0.1);
    assert!(!is_strictly_left(a, b, DVec2::new(0.3, 0.3)));
    assert!(is_strictly_left(a, b, DVec2::new(0.0, 0.3)));
}

#[test]
fn in_circle_signs() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    let c = DVec2::new(0.0, 1.0);
    assert!(in_circle(a, b, c, DVec2::new(0.5, 0.5)) > 0.0);
    assert!(in_circle(a, b, c, DVec2::new(2.0, 2.0)) < 0.0);
}

#[test]
fn cocircular_is_not_strictly_inside() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    let c = DVec2::new(1.0, 1.0);
    assert!(!is_strictly_in_circle(a, b, c, DVec2::new(0.0, 1.0)));
}

// ─── Triangulation Tests ──────────────────────────────────────

#[test]
fn single_triangle() {
    let points = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(0.0, 1.0),
    ];
    let faces = triangulate(&points).unwrap();
    assert_eq!(faces.len(), 1);
    assert!(area2(&points, faces[0]) > 0.0);
}

#[test]
fn square_with_center() {
    let points = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
        DVec2::new(0.5, 0.5),
    ];
    let faces = triangulate(&points).unwrap();
    assert_eq!(faces.len(), 4);
    for &f in &faces {
        assert!(f.contains(&4));
    }
}

#[test]
fn grid_3x3_covers_square() {
    let points = grid(3, 3, 0.5);
    let faces = triangulate(&points).unwrap();
    // 2n - 2 - h with all 8 boundary points on the hull.
    assert_eq!(faces.len(), 8);
    let total: f64 = faces.iter().map(|&f| area2(&points, f) * 0.5).sum();
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn grid_with_inexact_spacing_covers_rectangle() {
    let points = grid(11, 7, 0.1);
    let faces = triangulate(&points).unwrap();
    assert_eq!(faces.len(), 2 * 10 * 6);
    for &f in &faces {
        assert!(area2(&points, f) > 0.0, "triangle {f:?} is not counter-clockwise");
    }
    let total: f64 = faces.iter().map(|&f| area2(&points, f) * 0.5).sum();
    assert!((total - 1.0 * 0.6).abs() < 1e-9);
}

#[test]
fn every_point_is_used() {
    let points = grid(5, 4, 0.25);
    let faces = triangulate(&points).unwrap();
    let mut used = vec![false; points.len()];
    for f in &faces {
        for &v in f {
            used[v as usize] = true;
        }
    }
    assert!(used.iter().all(|&u| u));
}

#[test]
fn random_points_are_delaunay() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let points: Vec<DVec2> = (0..200)
        .map(|_| DVec2::new(rng.random::<f64>(), rng.random::<f64>()))
        .collect();
    let faces = triangulate(&points).unwrap();
    for &f in &faces {
        assert!(area2(&points, f) > 0.0);
    }
    assert_delaunay(&points, &faces);
}

#[test]
fn triangulation_is_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let points: Vec<DVec2> = (0..100)
        .map(|_| DVec2::new(rng.random_range(0.0..2.0), rng.random_range(0.0..1.0)))
        .collect();
    assert_eq!(triangulate(&points).unwrap(), triangulate(&points).unwrap());
}

#[test]
fn too_few_points_rejected() {
    let points = vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)];
    assert!(matches!(
        triangulate(&points),
        Err(WeftError::DegenerateSampling(_))
    ));
}

#[test]
fn collinear_points_rejected() {
    let points: Vec<DVec2> = (0..5).map(|i| DVec2::new(i as f64, 2.0 * i as f64)).collect();
    assert!(matches!(
        triangulate(&points),
        Err(WeftError::DegenerateSampling(_))
    ));
}

#[test]
fn duplicate_points_rejected() {
    let points = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(0.0, 1.0),
        DVec2::new(1.0, 0.0),
    ];
    assert!(matches!(
        triangulate(&points),
        Err(WeftError::DegenerateSampling(_))
    ));
}

#[test]
fn non_finite_point_rejected() {
    let points = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(f64::NAN, 0.0),
        DVec2::new(0.0, 1.0),
    ];
    assert!(triangulate(&points).is_err());
}
