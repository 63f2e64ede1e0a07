//! Collision safety gate for a single tentative vertex move

use crate::collision::proximity::{edge_edge_proximity, point_triangle_proximity};
use crate::collision::{CandidateSet, Collision, CollisionCandidate, CollisionPipeline};
use crate::float_types::Real;
use crate::mesh::SurfaceMesh;

/// Why a tentative move was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafetyViolation {
    /// The continuous test found contact during the move.
    Collision(Collision),
    /// The move ends with a candidate pair closer than the rejection distance.
    TooClose {
        candidate: CollisionCandidate,
        distance: Real,
    },
}

/// Every candidate pair touched by moving `v`: points against its incident
/// triangles, `v` against all triangles, and its incident edges against all edges.
pub fn gather_candidates(mesh: &SurfaceMesh, pipeline: &dyn CollisionPipeline, v: usize) -> CandidateSet {
    let mut candidates = CandidateSet::new();
    for &t in mesh.vertex_triangles(v) {
        pipeline.add_triangle_candidates(mesh, t, &mut candidates);
    }
    pipeline.add_point_candidates(mesh, v, &mut candidates);
    for &e in mesh.vertex_edges(v) {
        pipeline.add_edge_candidates(mesh, e, &mut candidates);
    }
    candidates
}

/// Distance of a candidate pair at tentative positions.
pub fn candidate_distance(mesh: &SurfaceMesh, candidate: &CollisionCandidate) -> Real {
    match *candidate {
        CollisionCandidate::PointTriangle { vertex, triangle } => {
            let [a, b, c] = mesh.triangle(triangle);
            point_triangle_proximity(
                &mesh.new_position(vertex),
                &mesh.new_position(a),
                &mesh.new_position(b),
                &mesh.new_position(c),
            )
            .distance
        },
        CollisionCandidate::EdgeEdge { first, second } => {
            let [a0, a1] = mesh.edge(first);
            let [b0, b1] = mesh.edge(second);
            edge_edge_proximity(
                &mesh.new_position(a0),
                &mesh.new_position(a1),
                &mesh.new_position(b0),
                &mesh.new_position(b1),
            )
            .distance
        },
    }
}

/// Check the step of `v` from its committed to its tentative position while
/// every other vertex stays at rest.
///
/// Exact contact tests and static distances can disagree near zero, so a move
/// passes only if no candidate collides *and* every candidate ends at least
/// `epsilon` apart.
pub fn pseudo_motion_violation(
    mesh: &SurfaceMesh,
    pipeline: &dyn CollisionPipeline,
    v: usize,
    epsilon: Real,
) -> Option<SafetyViolation> {
    let candidates = gather_candidates(mesh, pipeline, v);

    if let Some(collision) = pipeline.any_collision(mesh, &candidates) {
        return Some(SafetyViolation::Collision(collision));
    }

    candidates.iter().find_map(|candidate| {
        let distance = candidate_distance(mesh, candidate);
        (distance < epsilon).then_some(SafetyViolation::TooClose {
            candidate: *candidate,
            distance,
        })
    })
}
