//! Collision candidates, broad phase and the pipeline trait the safety gate queries

use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::mesh::SurfaceMesh;
use std::collections::HashSet;

pub mod broad_phase;
pub mod ccd;
pub mod proximity;

use broad_phase::{MeshBroadPhase, swept_aabb, vertex_is_collidable};
use ccd::{Sweep, edge_edge_collision, point_triangle_collision};

/// A primitive pair that may collide during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCandidate {
    PointTriangle { vertex: usize, triangle: usize },
    /// Edge ids, smaller first.
    EdgeEdge { first: usize, second: usize },
}

impl CollisionCandidate {
    pub const fn point_triangle(vertex: usize, triangle: usize) -> Self {
        CollisionCandidate::PointTriangle { vertex, triangle }
    }

    pub fn edge_edge(a: usize, b: usize) -> Self {
        CollisionCandidate::EdgeEdge {
            first: a.min(b),
            second: a.max(b),
        }
    }
}

/// Insertion-ordered candidate accumulator that ignores duplicates.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    ordered: Vec<CollisionCandidate>,
    seen: HashSet<CollisionCandidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the candidate was already present.
    pub fn insert(&mut self, candidate: CollisionCandidate) -> bool {
        if !self.seen.insert(candidate) {
            return false;
        }
        self.ordered.push(candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionCandidate> {
        self.ordered.iter()
    }

    pub fn as_slice(&self) -> &[CollisionCandidate] {
        &self.ordered
    }
}

/// A candidate that reported contact, with its earliest contact time in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub candidate: CollisionCandidate,
    pub time: Real,
}

/// Collision queries over a step from committed to tentative positions.
///
/// Every query treats vertex `i` as moving linearly from
/// [`SurfaceMesh::position`] to [`SurfaceMesh::new_position`].
///
/// Pipelines may keep an acceleration structure. The smoothing pass calls
/// [`CollisionPipeline::rebuild`] before its first query and
/// [`CollisionPipeline::vertex_moved`] after every committed move; between
/// those calls only primitives touching the vertex being tested may differ
/// from what the structure recorded.
pub trait CollisionPipeline {
    /// Prepare for queries against `mesh`.
    fn rebuild(&mut self, _mesh: &SurfaceMesh) {}

    /// The committed position of `v` changed.
    fn vertex_moved(&mut self, _mesh: &SurfaceMesh, _v: usize) {}

    /// Points that may hit triangle `t`.
    fn add_triangle_candidates(&self, mesh: &SurfaceMesh, t: usize, candidates: &mut CandidateSet);

    /// Triangles that vertex `v` may hit.
    fn add_point_candidates(&self, mesh: &SurfaceMesh, v: usize, candidates: &mut CandidateSet);

    /// Edges that edge `e` may hit.
    fn add_edge_candidates(&self, mesh: &SurfaceMesh, e: usize, candidates: &mut CandidateSet);

    /// First candidate, in insertion order, that reports contact during the step.
    fn any_collision(&self, mesh: &SurfaceMesh, candidates: &CandidateSet) -> Option<Collision>;
}

/// Swept bounding box broad phase with a CCD narrow phase.
///
/// After [`CollisionPipeline::rebuild`] the broad phase searches a
/// [`MeshBroadPhase`]. Without one, or when the mesh no longer has the size
/// the trees were built for, it scans every primitive. Either way a
/// candidate is reported only if its current swept box meets the query box,
/// in ascending id order.
#[derive(Clone)]
pub struct SweptAabbPipeline {
    /// Distance every swept box is loosened by.
    pub margin: Real,
    broad_phase: Option<MeshBroadPhase>,
}

impl SweptAabbPipeline {
    pub const fn new(margin: Real) -> Self {
        Self {
            margin,
            broad_phase: None,
        }
    }

    /// The hierarchy built by the last rebuild, if it still fits `mesh`.
    pub fn broad_phase_for(&self, mesh: &SurfaceMesh) -> Option<&MeshBroadPhase> {
        self.broad_phase
            .as_ref()
            .filter(|bp| bp.matches(mesh) && bp.margin() == self.margin)
    }

    fn vertex_aabb(&self, mesh: &SurfaceMesh, v: usize) -> Aabb {
        swept_aabb(mesh, &[v], self.margin)
    }

    fn swept_aabb(&self, mesh: &SurfaceMesh, vertices: &[usize]) -> Aabb {
        swept_aabb(mesh, vertices, self.margin)
    }

    fn sweep(mesh: &SurfaceMesh, v: usize) -> Sweep {
        Sweep::new(mesh.position(v), mesh.new_position(v))
    }
}

impl Default for SweptAabbPipeline {
    fn default() -> Self {
        Self::new(1e-5)
    }
}

impl CollisionPipeline for SweptAabbPipeline {
    fn rebuild(&mut self, mesh: &SurfaceMesh) {
        self.broad_phase = Some(MeshBroadPhase::build(mesh, self.margin));
    }

    fn vertex_moved(&mut self, mesh: &SurfaceMesh, v: usize) {
        if let Some(broad_phase) = self.broad_phase.as_mut() {
            if broad_phase.matches(mesh) {
                broad_phase.refit_vertex(mesh, v);
            }
        }
    }

    fn add_triangle_candidates(&self, mesh: &SurfaceMesh, t: usize, candidates: &mut CandidateSet) {
        if mesh.triangle_is_deleted(t) {
            return;
        }
        let tri = mesh.triangle(t);
        let bounds = self.swept_aabb(mesh, &tri);
        let nearby = match self.broad_phase_for(mesh) {
            Some(bp) => bp.vertices_near(&bounds),
            None => (0..mesh.num_vertices()).collect(),
        };

        for v in nearby {
            if !vertex_is_collidable(mesh, v) || tri.contains(&v) {
                continue;
            }
            if bounds.intersects(&self.vertex_aabb(mesh, v)) {
                candidates.insert(CollisionCandidate::point_triangle(v, t));
            }
        }
    }

    fn add_point_candidates(&self, mesh: &SurfaceMesh, v: usize, candidates: &mut CandidateSet) {
        if mesh.vertex_is_deleted(v) {
            return;
        }
        let bounds = self.vertex_aabb(mesh, v);
        let nearby = match self.broad_phase_for(mesh) {
            Some(bp) => bp.triangles_near(&bounds),
            None => (0..mesh.num_triangles()).collect(),
        };

        for t in nearby {
            let tri = mesh.triangle(t);
            if mesh.triangle_is_deleted(t) || tri.contains(&v) {
                continue;
            }
            if bounds.intersects(&self.swept_aabb(mesh, &tri)) {
                candidates.insert(CollisionCandidate::point_triangle(v, t));
            }
        }
    }

    fn add_edge_candidates(&self, mesh: &SurfaceMesh, e: usize, candidates: &mut CandidateSet) {
        let edge = mesh.edge(e);
        let bounds = self.swept_aabb(mesh, &edge);
        let nearby = match self.broad_phase_for(mesh) {
            Some(bp) => bp.edges_near(&bounds),
            None => (0..mesh.num_edges()).collect(),
        };

        for other in nearby {
            let [a, b] = mesh.edge(other);
            if other == e || edge.contains(&a) || edge.contains(&b) {
                continue;
            }
            if bounds.intersects(&self.swept_aabb(mesh, &[a, b])) {
                candidates.insert(CollisionCandidate::edge_edge(e, other));
            }
        }
    }

    fn any_collision(&self, mesh: &SurfaceMesh, candidates: &CandidateSet) -> Option<Collision> {
        candidates.iter().find_map(|&candidate| {
            let time = match candidate {
                CollisionCandidate::PointTriangle { vertex, triangle } => {
                    let [a, b, c] = mesh.triangle(triangle);
                    point_triangle_collision(
                        &Self::sweep(mesh, vertex),
                        &Self::sweep(mesh, a),
                        &Self::sweep(mesh, b),
                        &Self::sweep(mesh, c),
                    )
                },
                CollisionCandidate::EdgeEdge { first, second } => {
                    let [a0, a1] = mesh.edge(first);
                    let [b0, b1] = mesh.edge(second);
                    edge_edge_collision(
                        &Self::sweep(mesh, a0),
                        &Self::sweep(mesh, a1),
                        &Self::sweep(mesh, b0),
                        &Self::sweep(mesh, b1),
                    )
                },
            }?;
            Some(Collision { candidate, time })
        })
    }
}
