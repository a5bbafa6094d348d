//! Integration tests for weft-mesh.

use std::io::Cursor;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use weft_math::{DVec2, DVec3};
use weft_mesh::generators::{lattice_points, poisson_disk_plane, poisson_disk_plane_seeded, uniform_grid_plane};
use weft_mesh::obj::{load_obj, read_obj, save_obj, write_obj};
use weft_mesh::sampling::PoissonDiskSampler;
use weft_mesh::TriangleMesh;
use weft_types::{NodeId, WeftError};

// ─── TriangleMesh Tests ───────────────────────────────────────

fn make_single_triangle() -> TriangleMesh {
    TriangleMesh {
        pos_x: vec![0.0, 1.0, 0.0],
        pos_y: vec![0.0, 0.0, 1.0],
        pos_z: vec![0.0, 0.0, 0.0],
        indices: vec![0, 1, 2],
    }
}

fn triangle_area(mesh: &TriangleMesh, t: usize) -> f64 {
    let [a, b, c] = mesh.triangle(t);
    let pa = mesh.position_vec3(a as usize);
    let pb = mesh.position_vec3(b as usize);
    let pc = mesh.position_vec3(c as usize);
    0.5 * (pb - pa).cross(pc - pa).z
}

#[test]
fn basic_counts() {
    let mesh = make_single_triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.position(1), [1.0, 0.0, 0.0]);
    assert_eq!(mesh.triangle(0), [0, 1, 2]);
}

#[test]
fn validate_ok() {
    assert!(make_single_triangle().validate().is_ok());
}

#[test]
fn validate_catches_inconsistent_lengths() {
    let mut mesh = make_single_triangle();
    mesh.pos_y.push(99.0);
    assert!(matches!(mesh.validate(), Err(WeftError::InvalidMesh(_))));
}

#[test]
fn validate_catches_oob_index() {
    let mut mesh = make_single_triangle();
    mesh.indices[2] = 99;
    assert!(matches!(
        mesh.validate(),
        Err(WeftError::IndexOutOfRange { index: 99, count: 3 })
    ));
}

#[test]
fn validate_catches_degenerate_triangle() {
    let mut mesh = make_single_triangle();
    mesh.indices = vec![0, 0, 1];
    assert!(mesh.validate().is_err());
}

#[test]
fn orphan_vertices_listed() {
    let mut mesh = make_single_triangle();
    mesh.push_vertex([5.0, 5.0, 0.0]);
    assert_eq!(mesh.orphan_vertices(), vec![3]);
}

#[test]
fn bounds_cover_all_vertices() {
    let (lo, hi) = make_single_triangle().bounds().unwrap();
    assert_eq!(lo, DVec3::ZERO);
    assert_eq!(hi, DVec3::new(1.0, 1.0, 0.0));
    assert!(TriangleMesh::default().bounds().is_none());
}

#[test]
fn mesh_serde_json_roundtrip() {
    let mesh = make_single_triangle();
    let json = serde_json::to_string(&mesh).unwrap();
    let back: TriangleMesh = serde_json::from_str(&json).unwrap();
    assert_eq!(mesh, back);
}

// ─── Nearest Vertex Tests ─────────────────────────────────────

#[test]
fn nearest_vertices_within_threshold() {
    let mesh = uniform_grid_plane(1.0, 1.0, 0.5).unwrap();
    let found = mesh.find_nearest_vertices(
        &[DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.02, 0.98, 0.0)],
        0.1,
    );
    let corner = (0..mesh.vertex_count())
        .find(|&i| mesh.position(i) == [1.0, 1.0, 0.0])
        .unwrap();
    let origin = (0..mesh.vertex_count())
        .find(|&i| mesh.position(i) == [0.0, 0.0, 0.0])
        .unwrap();
    assert_eq!(found, vec![Some(NodeId(origin as u32)), Some(NodeId(corner as u32))]);
}

#[test]
fn nearest_vertices_beyond_threshold_is_none() {
    let mesh = make_single_triangle();
    let found = mesh.find_nearest_vertices(&[DVec3::new(0.5, 0.5, 0.5)], 0.1);
    assert_eq!(found, vec![None]);
}

#[test]
fn nearest_vertices_threshold_is_exclusive() {
    let mesh = make_single_triangle();
    let found = mesh.find_nearest_vertices(&[DVec3::new(0.0, 0.0, 0.25)], 0.25);
    assert_eq!(found, vec![None]);
}

#[test]
fn nearest_vertices_on_empty_mesh() {
    let found = TriangleMesh::default().find_nearest_vertices(&[DVec3::ZERO], 1.0);
    assert_eq!(found, vec![None]);
}

// ─── Grid Generator Tests ─────────────────────────────────────

#[test]
fn grid_plane_counts() {
    let mesh = uniform_grid_plane(1.0, 1.0, 0.5).unwrap();
    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.triangle_count(), 8);
    assert!(mesh.validate().is_ok());
    assert!(mesh.orphan_vertices().is_empty());
}

#[test]
fn grid_plane_is_flat_and_covers_rectangle() {
    let mesh = uniform_grid_plane(1.0, 0.6, 0.1).unwrap();
    assert_eq!(mesh.vertex_count(), 11 * 7);
    assert_eq!(mesh.triangle_count(), 2 * 10 * 6);
    assert!(mesh.pos_z.iter().all(|&z| z == 0.0));

    let area: f64 = (0..mesh.triangle_count()).map(|t| triangle_area(&mesh, t)).sum();
    assert!((area - 0.6).abs() < 1e-9);
}

#[test]
fn grid_plane_triangles_counter_clockwise() {
    let mesh = uniform_grid_plane(2.0, 1.0, 0.25).unwrap();
    for t in 0..mesh.triangle_count() {
        assert!(triangle_area(&mesh, t) > 0.0, "triangle {t} is not CCW");
    }
}

#[test]
fn lattice_stretches_uneven_spacing() {
    let points = lattice_points(1.0, 1.0, 0.4).unwrap();
    // floor(2.5) + 1 = 3 per side, spanning the full edge
    assert_eq!(points.len(), 9);
    assert_eq!(points[0], DVec2::new(0.0, 0.0));
    assert_eq!(points[1], DVec2::new(0.0, 0.5));
    assert_eq!(points[8], DVec2::new(1.0, 1.0));
}

#[test]
fn lattice_rejects_bad_spacing() {
    assert!(matches!(
        lattice_points(1.0, 1.0, 0.0),
        Err(WeftError::InvalidConfig(_))
    ));
    assert!(matches!(
        lattice_points(-1.0, 1.0, 0.1),
        Err(WeftError::InvalidConfig(_))
    ));
}

#[test]
fn grid_too_coarse_is_degenerate() {
    // Spacing larger than the height leaves a single collinear row
    let err = uniform_grid_plane(1.0, 0.1, 0.5).unwrap_err();
    assert!(matches!(err, WeftError::DegenerateSampling(_)));
}

// ─── Poisson-Disk Tests ───────────────────────────────────────

#[test]
fn sampler_radius_from_shorter_side() {
    let sampler = PoissonDiskSampler::new(2.0, 1.0, 10, 30).unwrap();
    assert!((sampler.radius() - 0.1).abs() < 1e-15);
}

#[test]
fn sampler_rejects_bad_parameters() {
    assert!(PoissonDiskSampler::new(0.0, 1.0, 10, 30).is_err());
    assert!(PoissonDiskSampler::new(1.0, 1.0, 0, 30).is_err());
    assert!(PoissonDiskSampler::new(1.0, 1.0, 10, 0).is_err());
}

#[test]
fn border_points_cover_edges() {
    let sampler = PoissonDiskSampler::new(1.0, 1.0, 4, 30).unwrap();
    let border = sampler.border_points();
    // 5 points per edge, 4 shared corners
    assert_eq!(border.len(), 16);
    for p in &border {
        assert!(p.x == 0.0 || p.x == 1.0 || p.y == 0.0 || p.y == 1.0);
    }
    for pair in border.windows(2) {
        assert!((pair[0].x, pair[0].y) < (pair[1].x, pair[1].y));
    }
}

#[test]
fn sample_starts_with_border() {
    let sampler = PoissonDiskSampler::new(1.0, 1.0, 5, 30).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let points = sampler.sample(&mut rng);
    let border = sampler.border_points();
    assert!(points.len() > border.len());
    assert_eq!(&points[..border.len()], &border[..]);
    assert!(points.iter().all(|&p| sampler.contains(p)));
}

#[test]
fn poisson_plane_is_valid_mesh() {
    let mesh = poisson_disk_plane_seeded(1.0, 1.0, 10, 30, 42).unwrap();
    assert!(mesh.validate().is_ok());
    assert!(mesh.orphan_vertices().is_empty());
    assert!(mesh.pos_z.iter().all(|&z| z == 0.0));

    let area: f64 = (0..mesh.triangle_count()).map(|t| triangle_area(&mesh, t)).sum();
    assert!((area - 1.0).abs() < 1e-9, "area {area}");
}

#[test]
fn poisson_plane_seeded_is_reproducible() {
    let a = poisson_disk_plane_seeded(1.0, 0.5, 8, 30, 9).unwrap();
    let b = poisson_disk_plane_seeded(1.0, 0.5, 8, 30, 9).unwrap();
    assert_eq!(a, b);

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let c = poisson_disk_plane(1.0, 0.5, 8, 30, &mut rng).unwrap();
    assert_eq!(a, c);
}

#[test]
fn poisson_plane_different_seeds_differ() {
    let a = poisson_disk_plane_seeded(1.0, 1.0, 8, 30, 1).unwrap();
    let b = poisson_disk_plane_seeded(1.0, 1.0, 8, 30, 2).unwrap();
    assert_ne!(a, b);
}

fn min_spacing(mesh: &TriangleMesh) -> f64 {
    let mut best = f64::INFINITY;
    for i in 0..mesh.vertex_count() {
        for j in (i + 1)..mesh.vertex_count() {
            best = best.min(mesh.position_vec3(i).distance(mesh.position_vec3(j)));
        }
    }
    best
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn poisson_spacing_holds_for_any_seed(seed in any::<u64>()) {
        // r = 0.125 divides both sides, so the border is regular too
        let mesh = poisson_disk_plane_seeded(1.0, 0.5, 4, 30, seed).unwrap();
        prop_assert!(min_spacing(&mesh) >= 0.125 - 1e-12);
        prop_assert!(mesh.orphan_vertices().is_empty());
    }
}

// ─── Mesh Text Format Tests ───────────────────────────────────

#[test]
fn obj_write_format() {
    let mut buf = Vec::new();
    write_obj(&make_single_triangle(), &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
}

#[test]
fn obj_file_roundtrip_is_exact() {
    let mesh = poisson_disk_plane_seeded(1.0, 1.0, 6, 30, 5).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cloth.obj");

    save_obj(&mesh, &path).unwrap();
    let back = load_obj(&path).unwrap();
    assert_eq!(mesh, back);
}

#[test]
fn obj_reader_skips_other_records() {
    let text = "# cloth\nv 0 0 0\nvn 0 0 1\nv 1 0 0\nvt 0 0\nv 0 1 0\nf 1/1/1 2/2/1 3/3/1\n";
    let mesh = read_obj(Cursor::new(text)).unwrap();
    assert_eq!(mesh, make_single_triangle());
}

#[test]
fn obj_reader_rejects_out_of_range_face() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n";
    let err = read_obj(Cursor::new(text)).unwrap_err();
    assert!(matches!(err, WeftError::IndexOutOfRange { index: 6, count: 3 }));
}

#[test]
fn obj_reader_rejects_zero_id() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
    assert!(matches!(
        read_obj(Cursor::new(text)),
        Err(WeftError::InvalidMesh(_))
    ));
}

#[test]
fn obj_reader_rejects_short_vertex() {
    let text = "v 0 0\n";
    assert!(matches!(
        read_obj(Cursor::new(text)),
        Err(WeftError::InvalidMesh(_))
    ));
}

#[test]
fn load_missing_obj_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_obj(dir.path().join("missing.obj")).unwrap_err();
    assert!(matches!(err, WeftError::Io(_)));
}
