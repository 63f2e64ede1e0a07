//! Per-pass bounding volume hierarchies over mesh primitives.
//!
//! Vertices, live triangles and edges each get a parry [`Qbvh`] whose leaves
//! hold the primitive's box swept from committed to tentative positions. The
//! trees are built once per smoothing pass and refitted after each committed
//! move, so a safety-gate query costs `O(log n + k)` instead of a full scan.

use crate::float_types::{
    Real,
    parry3d::{
        bounding_volume::{Aabb, BoundingVolume},
        partitioning::{Qbvh, QbvhUpdateWorkspace},
    },
};
use crate::mesh::SurfaceMesh;

/// Swept box of a set of vertices, loosened by `margin`.
pub fn swept_aabb(mesh: &SurfaceMesh, vertices: &[usize], margin: Real) -> Aabb {
    vertices
        .iter()
        .map(|&v| {
            let (start, end) = (mesh.position(v), mesh.new_position(v));
            Aabb::new(start.inf(&end), start.sup(&end))
        })
        .reduce(|acc, aabb| acc.merged(&aabb))
        .map_or_else(Aabb::new_invalid, |aabb| aabb.loosened(margin))
}

/// Vertices that can take part in a collision: live and attached to a triangle.
pub fn vertex_is_collidable(mesh: &SurfaceMesh, v: usize) -> bool {
    !mesh.vertex_is_deleted(v) && !mesh.vertex_triangles(v).is_empty()
}

/// Bounding volume hierarchies over the vertices, triangles and edges of one mesh.
#[derive(Clone)]
pub struct MeshBroadPhase {
    margin: Real,
    vertices: Qbvh<usize>,
    triangles: Qbvh<usize>,
    edges: Qbvh<usize>,
    /// Vertex, triangle and edge counts the trees were built for.
    counts: [usize; 3],
    workspace: QbvhUpdateWorkspace,
}

impl MeshBroadPhase {
    pub fn build(mesh: &SurfaceMesh, margin: Real) -> Self {
        let vertices: Vec<(usize, Aabb)> = (0..mesh.num_vertices())
            .filter(|&v| vertex_is_collidable(mesh, v))
            .map(|v| (v, swept_aabb(mesh, &[v], margin)))
            .collect();
        let triangles: Vec<(usize, Aabb)> = (0..mesh.num_triangles())
            .filter(|&t| !mesh.triangle_is_deleted(t))
            .map(|t| (t, swept_aabb(mesh, &mesh.triangle(t), margin)))
            .collect();
        let edges: Vec<(usize, Aabb)> = (0..mesh.num_edges())
            .map(|e| (e, swept_aabb(mesh, &mesh.edge(e), margin)))
            .collect();

        let mut broad_phase = MeshBroadPhase {
            margin,
            vertices: Qbvh::new(),
            triangles: Qbvh::new(),
            edges: Qbvh::new(),
            counts: [mesh.num_vertices(), mesh.num_triangles(), mesh.num_edges()],
            workspace: QbvhUpdateWorkspace::default(),
        };
        broad_phase.vertices.clear_and_rebuild(vertices.into_iter(), 0.0);
        broad_phase.triangles.clear_and_rebuild(triangles.into_iter(), 0.0);
        broad_phase.edges.clear_and_rebuild(edges.into_iter(), 0.0);
        broad_phase
    }

    pub const fn margin(&self) -> Real {
        self.margin
    }

    /// Whether the trees were built for a mesh of this size.
    pub fn matches(&self, mesh: &SurfaceMesh) -> bool {
        self.counts == [mesh.num_vertices(), mesh.num_triangles(), mesh.num_edges()]
    }

    /// Grow the leaves of every primitive touching `v` to its current swept box.
    pub fn refit_vertex(&mut self, mesh: &SurfaceMesh, v: usize) {
        let margin = self.margin;

        self.vertices.pre_update_or_insert(v);
        self.vertices
            .refit(0.0, &mut self.workspace, |&u| swept_aabb(mesh, &[u], margin));

        for &t in mesh.vertex_triangles(v) {
            self.triangles.pre_update_or_insert(t);
        }
        self.triangles
            .refit(0.0, &mut self.workspace, |&t| swept_aabb(mesh, &mesh.triangle(t), margin));

        for &e in mesh.vertex_edges(v) {
            self.edges.pre_update_or_insert(e);
        }
        self.edges
            .refit(0.0, &mut self.workspace, |&e| swept_aabb(mesh, &mesh.edge(e), margin));
    }

    /// Collidable vertices whose leaf box meets `aabb`, ascending.
    pub fn vertices_near(&self, aabb: &Aabb) -> Vec<usize> {
        Self::query(&self.vertices, aabb)
    }

    /// Live triangles whose leaf box meets `aabb`, ascending.
    pub fn triangles_near(&self, aabb: &Aabb) -> Vec<usize> {
        Self::query(&self.triangles, aabb)
    }

    /// Edges whose leaf box meets `aabb`, ascending.
    pub fn edges_near(&self, aabb: &Aabb) -> Vec<usize> {
        Self::query(&self.edges, aabb)
    }

    fn query(tree: &Qbvh<usize>, aabb: &Aabb) -> Vec<usize> {
        let mut hits = Vec::new();
        tree.intersect_aabb(aabb, &mut hits);
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}
