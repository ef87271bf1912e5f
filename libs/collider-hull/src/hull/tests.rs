//! # Hull Tests
//!
//! Construction, degenerate input and output formatting for [`Hull`].

use super::*;
use approx::assert_relative_eq;
use config::Tolerance;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Corner `i` of the unit cube, bit 0 = x, bit 1 = y, bit 2 = z.
fn cube_corners() -> Vec<DVec3> {
    (0..8)
        .map(|i| DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
        .collect()
}

fn regular_tetrahedron() -> Vec<DVec3> {
    vec![
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(1.0, -1.0, -1.0),
        DVec3::new(-1.0, 1.0, -1.0),
        DVec3::new(-1.0, -1.0, 1.0),
    ]
}

/// Random convex combinations of `corners`, pulled towards their centroid so
/// they stay strictly inside.
fn interior_points(corners: &[DVec3], count: usize, rng: &mut ChaCha8Rng) -> Vec<DVec3> {
    let center = corners.iter().copied().sum::<DVec3>() / corners.len() as f64;
    (0..count)
        .map(|_| {
            let weights: Vec<f64> = corners.iter().map(|_| rng.gen::<f64>() + 0.01).collect();
            let total: f64 = weights.iter().sum();
            let p = corners
                .iter()
                .zip(&weights)
                .map(|(&c, &w)| c * (w / total))
                .sum::<DVec3>();
            center + (p - center) * 0.9
        })
        .collect()
}

fn random_cloud(count: usize, seed: u64) -> Vec<DVec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            DVec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        })
        .collect()
}

/// Evenly spread points on the unit sphere; every one is a hull vertex.
fn fibonacci_sphere(count: usize) -> Vec<DVec3> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            DVec3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

fn sorted(points: &[DVec3]) -> Vec<[f64; 3]> {
    let mut out: Vec<[f64; 3]> = points.iter().map(|p| p.to_array()).collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out
}

fn assert_outward(hull: &Hull) {
    let center = hull.vertices().iter().copied().sum::<DVec3>() / hull.vertex_count() as f64;
    let loops = hull.faces(FaceFlags::default());
    for (face, normal) in loops.iter().zip(hull.face_normals()) {
        assert_relative_eq!(normal.length(), 1.0, epsilon = 1e-12);
        let a = hull.vertices()[face[0]];
        let b = hull.vertices()[face[1]];
        let c = hull.vertices()[face[2]];
        let winding = (b - a).cross(c - a);
        assert!(winding.dot(normal) > 0.0, "loop winding disagrees with normal");
        assert!(normal.dot(a - center) > 0.0, "normal points inward");
    }
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[test]
fn test_unit_cube_gives_six_quads() {
    let hull = build_hull(&cube_corners()).unwrap();
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 6);
    for face in hull.faces(FaceFlags::default()) {
        assert_eq!(face.len(), 4);
    }
    assert_outward(&hull);
    hull.check(&cube_corners(), hull.distance_tolerance()).unwrap();
}

#[test]
fn test_unit_cube_triangulated() {
    let config = HullConfig {
        triangulate: true,
        ..HullConfig::default()
    };
    let hull = HullBuilder::new(config).build(&cube_corners()).unwrap();
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 12);
    for face in hull.faces(FaceFlags::default()) {
        assert_eq!(face.len(), 3);
    }
    assert_outward(&hull);
    hull.check(&cube_corners(), hull.distance_tolerance()).unwrap();
}

#[test]
fn test_triangulated_matches_builder_option() {
    let hull = build_hull(&cube_corners()).unwrap().triangulated().unwrap();
    assert_eq!(hull.face_count(), 12);
}

#[test]
fn test_tetrahedron_absorbs_interior_points() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let corners = regular_tetrahedron();
    let mut points = corners.clone();
    points.extend(interior_points(&corners, 50, &mut rng));

    let hull = build_hull(&points).unwrap();
    assert_eq!(hull.vertex_count(), 4);
    assert_eq!(hull.face_count(), 4);
    assert_eq!(hull.vertex_point_indices(), &[0, 1, 2, 3]);
    assert_eq!(hull.vertices(), corners.as_slice());
    assert_outward(&hull);
    hull.check(&points, hull.distance_tolerance()).unwrap();
}

#[test]
fn test_cube_with_interior_points() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let corners = cube_corners();
    let mut points = interior_points(&corners, 200, &mut rng);
    points.extend(corners.iter().copied());

    let hull = build_hull(&points).unwrap();
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 6);
    assert_eq!(sorted(hull.vertices()), sorted(&corners));
    assert_eq!(hull.vertex_point_indices(), &[200, 201, 202, 203, 204, 205, 206, 207]);
}

#[test]
fn test_sphere_points_all_on_hull() {
    let points = fibonacci_sphere(200);
    let hull = build_hull(&points).unwrap().triangulated().unwrap();
    assert_eq!(hull.vertex_count(), 200);
    // Euler: a triangulated convex polytope with V vertices has 2V - 4 faces
    assert_eq!(hull.face_count(), 2 * 200 - 4);
    assert_outward(&hull);
    hull.check(&points, hull.distance_tolerance()).unwrap();
}

#[test]
fn test_random_cloud_contains_every_point() {
    for seed in 0..5 {
        let points = random_cloud(500, seed);
        let hull = build_hull(&points).unwrap();
        assert!(hull.vertex_count() >= 4);
        assert!(hull.vertex_count() < points.len());
        hull.check(&points, hull.distance_tolerance()).unwrap();
    }
}

#[test]
fn test_grid_on_cube_surface() {
    // Many points lie exactly on faces and edges of the cube
    let mut points = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            for k in 0..5 {
                points.push(DVec3::new(i as f64, j as f64, k as f64) * 0.25);
            }
        }
    }
    let hull = build_hull(&points).unwrap();
    hull.check(&points, hull.distance_tolerance()).unwrap();
    for corner in cube_corners() {
        assert!(hull.vertices().contains(&corner));
    }
}

#[test]
fn test_rebuild_on_own_vertices_is_stable() {
    let points = random_cloud(300, 42);
    let hull = build_hull(&points).unwrap();
    let again = build_hull(hull.vertices()).unwrap();

    assert_eq!(again.vertex_count(), hull.vertex_count());
    assert_eq!(again.face_count(), hull.face_count());
    assert_eq!(sorted(again.vertices()), sorted(hull.vertices()));
}

#[test]
fn test_explicit_tolerance_is_reported() {
    let config = HullConfig::new(Tolerance::Explicit(1e-3), false).unwrap();
    let hull = HullBuilder::new(config).build(&cube_corners()).unwrap();
    assert_eq!(hull.distance_tolerance(), 1e-3);
    assert_eq!(hull.char_length(), 1.0);
}

#[test]
fn test_automatic_tolerance_scales_with_coordinates() {
    let small = build_hull(&cube_corners()).unwrap();
    let scaled: Vec<DVec3> = cube_corners().iter().map(|&p| p * 1000.0).collect();
    let large = build_hull(&scaled).unwrap();
    assert_relative_eq!(
        large.distance_tolerance(),
        small.distance_tolerance() * 1000.0,
        max_relative = 1e-12
    );
    assert_relative_eq!(small.distance_tolerance(), 3.0 * f64::EPSILON * 3.0);
}

#[test]
fn test_invalid_tolerance_literal_is_rejected() {
    let config = HullConfig {
        tolerance: Tolerance::Explicit(-0.5),
        triangulate: false,
    };
    let err = HullBuilder::new(config).build(&random_cloud(200, 3)).unwrap_err();
    assert_eq!(
        err,
        HullError::Config(config::ConfigError::InvalidTolerance(-0.5))
    );
    assert!(!err.is_defect());
}

#[test]
fn test_deserialized_negative_tolerance_never_builds() {
    let json = r#"{"tolerance":{"Explicit":-0.5},"triangulate":false}"#;
    assert!(serde_json::from_str::<HullConfig>(json).is_err());

    let json = r#"{"tolerance":{"Explicit":1e-9},"triangulate":false}"#;
    let config: HullConfig = serde_json::from_str(json).unwrap();
    let points = random_cloud(200, 3);
    let hull = HullBuilder::new(config).build(&points).unwrap();
    hull.check(&points, hull.distance_tolerance()).unwrap();
}

// =============================================================================
// DEGENERATE INPUT
// =============================================================================

#[test]
fn test_empty_input() {
    assert_eq!(build_hull(&[]).unwrap_err(), HullError::EmptyInput);
}

#[test]
fn test_too_few_points() {
    let points = &cube_corners()[..3];
    assert_eq!(build_hull(points).unwrap_err(), HullError::TooFewPoints { count: 3 });
}

#[test]
fn test_non_finite_coordinate() {
    let mut points = cube_corners();
    points[5].y = f64::NAN;
    assert_eq!(
        build_hull(&points).unwrap_err(),
        HullError::NonFiniteCoordinate { index: 5 }
    );
}

#[test]
fn test_coincident_points() {
    let points = vec![DVec3::new(2.0, -1.0, 3.5); 6];
    assert_eq!(build_hull(&points).unwrap_err(), HullError::CoincidentPoints);
}

#[test]
fn test_collinear_points() {
    let points: Vec<DVec3> = (0..6)
        .map(|i| DVec3::new(1.0, 2.0, 3.0) * i as f64)
        .collect();
    let err = build_hull(&points).unwrap_err();
    assert!(matches!(err, HullError::CollinearPoints { .. }), "{err}");
    assert!(!err.is_defect());
}

#[test]
fn test_coplanar_points() {
    let mut points = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            points.push(DVec3::new(i as f64, j as f64, 0.0));
        }
    }
    let err = build_hull(&points).unwrap_err();
    assert!(matches!(err, HullError::CoplanarPoints { .. }), "{err}");
}

#[test]
fn test_nearly_coplanar_within_degeneracy_band() {
    // Lift one point by less than 100 tolerances
    let mut points = cube_corners();
    points.truncate(4);
    points.push(DVec3::new(0.5, 0.5, 0.0));
    points[4].z = 10.0 * 3.0 * f64::EPSILON * 2.0;
    let err = build_hull(&points).unwrap_err();
    assert!(matches!(err, HullError::CoplanarPoints { .. }), "{err}");
}

// =============================================================================
// FACE OUTPUT
// =============================================================================

fn unit_tetrahedron_with_interior_first() -> Vec<DVec3> {
    vec![
        DVec3::new(0.1, 0.1, 0.1),
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    ]
}

#[test]
fn test_face_flags_default() {
    assert_eq!(FaceFlags::default(), FaceFlags::empty());
    let all = FaceFlags::CLOCKWISE | FaceFlags::INDEX_FROM_ONE | FaceFlags::POINT_RELATIVE;
    assert!(all.contains(FaceFlags::INDEX_FROM_ONE));
    assert!(all.contains(FaceFlags::CLOCKWISE | FaceFlags::POINT_RELATIVE));
    assert!(!FaceFlags::CLOCKWISE.contains(all));
}

#[test]
fn test_clockwise_reverses_loops() {
    let hull = build_hull(&unit_tetrahedron_with_interior_first()).unwrap();
    let ccw = hull.faces(FaceFlags::default());
    let cw = hull.faces(FaceFlags::CLOCKWISE);
    for (a, b) in ccw.iter().zip(&cw) {
        assert_eq!(b, &vec![a[0], a[2], a[1]]);
    }
}

#[test]
fn test_index_from_one_and_point_relative() {
    let hull = build_hull(&unit_tetrahedron_with_interior_first()).unwrap();
    assert_eq!(hull.vertex_point_indices(), &[1, 2, 3, 4]);

    let local = hull.faces(FaceFlags::default());
    let one_based = hull.faces(FaceFlags::INDEX_FROM_ONE);
    let relative = hull.faces(FaceFlags::POINT_RELATIVE);
    let both = hull.faces(FaceFlags::POINT_RELATIVE | FaceFlags::INDEX_FROM_ONE);

    for i in 0..local.len() {
        for k in 0..local[i].len() {
            assert_eq!(one_based[i][k], local[i][k] + 1);
            assert_eq!(relative[i][k], hull.vertex_point_indices()[local[i][k]]);
            assert_eq!(both[i][k], relative[i][k] + 1);
        }
    }
    assert!(local.iter().flatten().all(|&i| i < 4));
    assert!(relative.iter().flatten().all(|&i| (1..=4).contains(&i)));
}

#[test]
fn test_every_vertex_used_by_a_face() {
    let hull = build_hull(&random_cloud(200, 3)).unwrap();
    let mut used = vec![false; hull.vertex_count()];
    for face in hull.faces(FaceFlags::default()) {
        for i in face {
            used[i] = true;
        }
    }
    assert!(used.into_iter().all(|u| u));
}

// =============================================================================
// EXPORT & CHECK
// =============================================================================

#[test]
fn test_to_mesh_of_cube() {
    let mesh = build_hull(&cube_corners()).unwrap().to_mesh();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.validate());
    let (min, max) = mesh.bounding_box();
    assert_eq!(min, DVec3::ZERO);
    assert_eq!(max, DVec3::ONE);

    let normals = mesh.normals().unwrap();
    for (n, v) in normals.iter().zip(mesh.vertices()) {
        assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
        assert!(n.dot(*v - DVec3::splat(0.5)) > 0.0);
    }
}

#[test]
fn test_check_rejects_outside_point() {
    let hull = build_hull(&cube_corners()).unwrap();
    let err = hull
        .check(&[DVec3::new(0.5, 0.5, 2.0)], hull.distance_tolerance())
        .unwrap_err();
    assert!(err.is_defect());
    assert!(err.to_string().contains("above face"));
}

#[test]
fn test_clockwise_keeps_first_vertex_of_quads() {
    let hull = build_hull(&cube_corners()).unwrap();
    let ccw = hull.faces(FaceFlags::default());
    let cw = hull.faces(FaceFlags::CLOCKWISE);
    for (a, b) in ccw.iter().zip(&cw) {
        assert_eq!(b, &vec![a[0], a[3], a[2], a[1]]);
    }
}

#[test]
fn test_unindexed_vertex_is_a_defect() {
    let polygons = vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]];
    let (mut mesh, faces) = HalfEdgeMesh::from_polygons(&regular_tetrahedron(), &polygons).unwrap();
    assert_eq!(index_loops(&mesh, &faces).unwrap()[0], vec![0, 2, 1]);

    mesh.vertex_mut(VertexId(2)).index = None;
    let err = index_loops(&mesh, &faces).unwrap_err();
    assert!(err.is_defect());
    assert!(err.to_string().contains("vertex 2 was not re-indexed"));
}
