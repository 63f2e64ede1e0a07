//! Feature edge detection and vertex classification
//!
//! Angles here are measured between consistently oriented triangle normals:
//! 0 on a flat surface, π for a surface folded completely back on itself.

use crate::float_types::{PI, Real};
use crate::mesh::SurfaceMesh;
use crate::smoothing::cache::TriangleCache;
use nalgebra::Vector3;
use std::collections::BTreeSet;

/// Junctions with more incident triangles than this are too complex to judge.
pub const MAX_JUNCTION_TRIANGLES: usize = 3;

/// Local shape class of a vertex, from its count of incident feature edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VertexClass {
    /// No feature edges.
    Smooth,
    /// One or two feature edges, listed in incidence order.
    Ridge { feature_edges: Vec<usize> },
    /// Three or more feature edges.
    Corner { feature_edges: usize },
}

impl VertexClass {
    pub fn feature_edge_count(&self) -> usize {
        match self {
            VertexClass::Smooth => 0,
            VertexClass::Ridge { feature_edges } => feature_edges.len(),
            VertexClass::Corner { feature_edges } => *feature_edges,
        }
    }
}

#[inline]
fn angle_between(a: &Vector3<Real>, b: &Vector3<Real>) -> Real {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Largest angle between the normals of any two triangles sharing edge `e`.
///
/// Two triangles that traverse the edge in the same direction are oppositely
/// wound, so one normal is flipped before comparing. Pairs involving a
/// zero normal (collapsed triangle) are ignored.
pub fn largest_dihedral(mesh: &SurfaceMesh, cache: &TriangleCache, e: usize) -> Real {
    let [a, b] = mesh.edge(e);
    let tris = mesh.edge_triangles(e);
    let mut largest: Real = 0.0;

    for (i, &t0) in tris.iter().enumerate() {
        let n0 = cache.normal(t0);
        if *n0 == Vector3::zeros() {
            continue;
        }
        for &t1 in &tris[i + 1..] {
            let mut n1 = *cache.normal(t1);
            if n1 == Vector3::zeros() {
                continue;
            }
            if mesh.triangle_traverses(t0, a, b) == mesh.triangle_traverses(t1, a, b) {
                n1 = -n1;
            }
            largest = largest.max(angle_between(n0, &n1));
        }
    }

    largest
}

/// An edge is a feature when its largest normal angle exceeds `threshold`.
pub fn edge_is_feature(mesh: &SurfaceMesh, cache: &TriangleCache, e: usize, threshold: Real) -> bool {
    largest_dihedral(mesh, cache, e) > threshold
}

/// Feature edges incident to `v`, in the vertex's edge incidence order.
pub fn vertex_feature_edges(
    mesh: &SurfaceMesh,
    cache: &TriangleCache,
    v: usize,
    threshold: Real,
) -> Vec<usize> {
    mesh.vertex_edges(v)
        .iter()
        .copied()
        .filter(|&e| edge_is_feature(mesh, cache, e, threshold))
        .collect()
}

pub fn vertex_feature_edge_count(
    mesh: &SurfaceMesh,
    cache: &TriangleCache,
    v: usize,
    threshold: Real,
) -> usize {
    vertex_feature_edges(mesh, cache, v, threshold).len()
}

pub fn classify_vertex(
    mesh: &SurfaceMesh,
    cache: &TriangleCache,
    v: usize,
    threshold: Real,
) -> VertexClass {
    let feature_edges = vertex_feature_edges(mesh, cache, v, threshold);
    match feature_edges.len() {
        0 => VertexClass::Smooth,
        1 | 2 => VertexClass::Ridge { feature_edges },
        n => VertexClass::Corner { feature_edges: n },
    }
}

/// Whether any edge at `v` is folded to within `fold_threshold` of a full turn.
pub fn has_folded_feature(
    mesh: &SurfaceMesh,
    cache: &TriangleCache,
    v: usize,
    fold_threshold: Real,
) -> bool {
    mesh.vertex_edges(v)
        .iter()
        .any(|&e| PI - largest_dihedral(mesh, cache, e) < fold_threshold)
}

/// The region whose surface is most sharply bent at `v`, with that angle.
///
/// Every region on either side of an incident triangle is a candidate. For
/// each incident edge with at most [`MAX_JUNCTION_TRIANGLES`] triangles, the
/// two triangles on that edge bordering a region are compared with normals
/// oriented away from that region. Ties keep the first (lowest) region found.
pub fn sharpest_region(mesh: &SurfaceMesh, cache: &TriangleCache, v: usize) -> Option<(i32, Real)> {
    let regions: BTreeSet<i32> = mesh
        .vertex_triangles(v)
        .iter()
        .flat_map(|&t| mesh.triangle_label(t))
        .collect();

    let mut sharpest: Option<(i32, Real)> = None;

    for &e in mesh.vertex_edges(v) {
        let tris = mesh.edge_triangles(e);
        if tris.len() > MAX_JUNCTION_TRIANGLES {
            continue;
        }

        for &region in &regions {
            let normals: Vec<Vector3<Real>> = tris
                .iter()
                .filter(|&&t| mesh.triangle_label(t).contains(&region))
                .map(|&t| mesh.orient_normal_by_region(t, region, *cache.normal(t)))
                .collect();

            let [n0, n1] = normals.as_slice() else {
                continue;
            };
            if *n0 == Vector3::zeros() || *n1 == Vector3::zeros() {
                continue;
            }

            let angle = angle_between(n0, n1);
            if angle > sharpest.map_or(0.0, |(_, best)| best) {
                sharpest = Some((region, angle));
            }
        }
    }

    sharpest
}

/// Geometric ridge tangent used when the quadric's direction is ill-conditioned.
///
/// One feature edge: its own direction. Two: the direction between their midpoints.
pub fn ridge_direction_from_edges(mesh: &SurfaceMesh, feature_edges: &[usize]) -> Option<Vector3<Real>> {
    match feature_edges {
        [e] => {
            let [a, b] = mesh.edge(*e);
            (mesh.position(a) - mesh.position(b)).try_normalize(Real::MIN_POSITIVE)
        },
        [e0, e1] => {
            let midpoint = |e: usize| {
                let [a, b] = mesh.edge(e);
                (mesh.position(a).coords + mesh.position(b).coords) * 0.5
            };
            (midpoint(*e0) - midpoint(*e1)).try_normalize(Real::MIN_POSITIVE)
        },
        _ => None,
    }
}
