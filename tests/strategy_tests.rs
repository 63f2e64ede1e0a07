mod support;

use nalgebra::{Point3, Vector3};
use support::{approx_eq, crease_fan, hex_fan_mesh, octahedron_mesh, skewed_corner, skewed_hex_fan};
use surfsmooth::{
    SmoothingParams, SurfaceMesh,
    float_types::{PI, Real},
    quadric::NalgebraEigenSolver,
    smoothing::{
        DisplacementStrategy, LocalGeometry, SkipReason, SmoothingDecision, TriangleCache,
        VertexClass, feature::classify_vertex,
    },
};

fn decide(mesh: &SurfaceMesh, params: &SmoothingParams, v: usize) -> (SmoothingDecision, Vector3<Real>) {
    let cache = TriangleCache::build(mesh, false);
    let solver = NalgebraEigenSolver::default();
    let geometry = LocalGeometry {
        mesh,
        cache: &cache,
        params,
        solver: &solver,
        vertex: v,
    };
    let decision = geometry.select_strategy();
    let displacement = match &decision {
        SmoothingDecision::Smooth(strategy) => geometry.displacement(strategy).unwrap(),
        SmoothingDecision::Skip(_) => Vector3::zeros(),
    };
    (decision, displacement)
}

#[test]
fn flat_fan_moves_tangentially_to_centroid() {
    let mesh = skewed_hex_fan();
    let (decision, d) = decide(&mesh, &SmoothingParams::default(), 0);

    println!("decision: {decision:?}, displacement: {d:?}");
    assert_eq!(decision, SmoothingDecision::Smooth(DisplacementStrategy::Dihedral));
    assert!(approx_eq(d.x, -0.75, 1e-9));
    assert!(approx_eq(d.y, 0.0, 1e-9));
    assert!(approx_eq(d.z, 0.0, 1e-12), "flat fan must not leave its plane");
}

#[test]
fn regular_fan_is_not_worth_smoothing() {
    let mesh = hex_fan_mesh(Point3::origin());
    let (decision, _) = decide(&mesh, &SmoothingParams::default(), 0);
    assert_eq!(decision, SmoothingDecision::Skip(SkipReason::AcceptableAngles));
}

#[test]
fn octahedron_vertices_are_not_worth_smoothing() {
    let mesh = octahedron_mesh();
    for v in 0..mesh.num_vertices() {
        let (decision, _) = decide(&mesh, &SmoothingParams::default(), v);
        assert_eq!(decision, SmoothingDecision::Skip(SkipReason::AcceptableAngles));
    }
}

#[test]
fn ring_vertices_touch_boundary_edges() {
    let mesh = skewed_hex_fan();
    for v in 1..=6 {
        let (decision, _) = decide(&mesh, &SmoothingParams::default(), v);
        assert_eq!(decision, SmoothingDecision::Skip(SkipReason::BoundaryEdge));
    }
}

#[test]
fn deleted_and_isolated_vertices_are_skipped() {
    let (mut positions, triangles) = support::hex_fan(Point3::new(0.75, 0.0, 0.0));
    positions.push(Point3::new(5.0, 5.0, 5.0));
    let mut mesh = SurfaceMesh::new(positions, triangles).unwrap();
    mesh.mark_vertex_deleted(0).unwrap();

    let (decision, _) = decide(&mesh, &SmoothingParams::default(), 0);
    assert_eq!(decision, SmoothingDecision::Skip(SkipReason::Deleted));
    let (decision, _) = decide(&mesh, &SmoothingParams::default(), 7);
    assert_eq!(decision, SmoothingDecision::Skip(SkipReason::Isolated));
}

#[test]
fn ridge_vertex_slides_along_crease() {
    let mesh = crease_fan(1.0);
    let cache = TriangleCache::build(&mesh, false);
    let class = classify_vertex(&mesh, &cache, 0, PI / 6.0);
    assert_eq!(class.feature_edge_count(), 2);
    assert!(matches!(class, VertexClass::Ridge { .. }));

    let (decision, d) = decide(&mesh, &SmoothingParams::default(), 0);
    println!("ridge displacement: {d:?}");
    assert_eq!(decision, SmoothingDecision::Smooth(DisplacementStrategy::Dihedral));
    assert!(d.cross(&Vector3::x()).norm() < 1e-9, "ridge motion must stay on the crease");
    assert!(approx_eq(d.x, -0.8, 1e-9));
}

#[test]
fn corner_vertex_stays_put() {
    let mesh = skewed_corner();
    let cache = TriangleCache::build(&mesh, false);
    assert_eq!(
        classify_vertex(&mesh, &cache, 0, PI / 6.0),
        VertexClass::Corner { feature_edges: 3 }
    );

    let (decision, d) = decide(&mesh, &SmoothingParams::default(), 0);
    assert_eq!(decision, SmoothingDecision::Smooth(DisplacementStrategy::Dihedral));
    assert_eq!(d, Vector3::zeros());
}

#[test]
fn folded_crease_uses_null_space_of_sharp_region() {
    let mesh = crease_fan(0.05);
    let (decision, d) = decide(&mesh, &SmoothingParams::default(), 0);

    println!("fold decision: {decision:?}, displacement: {d:?}");
    assert_eq!(
        decision,
        SmoothingDecision::Smooth(DisplacementStrategy::NullSpace {
            triangles: vec![0, 1, 2, 3]
        })
    );
    // Both sheets are almost normal to y, so only the y component is removed.
    assert!(approx_eq(d.x, -0.8, 1e-9));
    assert!(approx_eq(d.y, 0.0, 1e-9));
    assert!(approx_eq(d.z, -1.0 / 3.0, 1e-9));
}

#[test]
fn ill_conditioned_ridge_falls_back_to_edge_direction() {
    let mesh = crease_fan(0.05);
    let cache = TriangleCache::build(&mesh, false);
    let solver = NalgebraEigenSolver::default();
    let params = SmoothingParams::default();
    let geometry = LocalGeometry {
        mesh: &mesh,
        cache: &cache,
        params: &params,
        solver: &solver,
        vertex: 0,
    };

    let d = geometry
        .dihedral_displacement(mesh.vertex_triangles(0))
        .unwrap();
    assert!(approx_eq(d.x, -0.8, 1e-9));
    assert!(d.y.abs() < 1e-9 && d.z.abs() < 1e-9);
}

#[test]
fn aggressive_mode_uses_naive_laplacian() {
    let mesh = skewed_hex_fan();
    let params = SmoothingParams::default().with_aggressive_mode(true);
    let (decision, d) = decide(&mesh, &params, 0);
    assert_eq!(decision, SmoothingDecision::Smooth(DisplacementStrategy::Naive));
    assert!(approx_eq(d.x, -0.75, 1e-9));
}

#[test]
fn fold_threshold_can_disable_regularization() {
    let mesh = crease_fan(0.05);
    let params = SmoothingParams::default().with_sharp_fold_regularization_threshold(0.0);
    let (decision, _) = decide(&mesh, &params, 0);
    assert_eq!(decision, SmoothingDecision::Smooth(DisplacementStrategy::Dihedral));
}
