//! Displacement strategies and the policy that picks one per vertex
//!
//! **Mathematical Foundation: Tangential Area-Weighted Laplacian**
//!
//! Every strategy starts from the area-weighted centroid offset of a vertex `v`
//! over a set of triangles `T`:
//! ```text
//! t = Σ_{i∈T} Aᵢ (cᵢ − x_v) / Σ_{i∈T} Aᵢ
//! ```
//! and differs only in how much of `t` it keeps:
//! - **Null-space**: `P t` with `P` the projector onto the quadric null space
//! - **Dihedral-aware**: smooth vertices drop the component along Jiao's
//!   normal, ridge vertices keep only the component along the ridge tangent,
//!   corners keep nothing
//! - **Naive**: all of `t`

use crate::errors::{SmoothingError, SmoothingResult};
use crate::float_types::{PI, Real};
use crate::mesh::SurfaceMesh;
use crate::params::{PinnedAxisPolicy, SmoothingParams};
use crate::quadric::{QuadricEigen, SymmetricEigenSolver, medial_quadric, projection_matrix};
use crate::smoothing::cache::TriangleCache;
use crate::smoothing::feature::{
    VertexClass, classify_vertex, has_folded_feature, ridge_direction_from_edges, sharpest_region,
};
use nalgebra::Vector3;
use tracing::debug;

/// Everything a strategy may read about one vertex's neighbourhood.
#[derive(Clone, Copy)]
pub struct LocalGeometry<'a> {
    pub mesh: &'a SurfaceMesh,
    pub cache: &'a TriangleCache,
    pub params: &'a SmoothingParams,
    pub solver: &'a dyn SymmetricEigenSolver,
    pub vertex: usize,
}

/// How a vertex's displacement is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplacementStrategy {
    /// Quadric null-space projection over a subset of the incident triangles.
    NullSpace { triangles: Vec<usize> },
    /// Feature-aware projection over all incident triangles.
    Dihedral,
    /// Plain area-weighted Laplacian over all incident triangles.
    Naive,
}

/// Why a vertex was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Deleted,
    /// No incident triangles.
    Isolated,
    /// An incident edge has a single triangle.
    BoundaryEdge,
    /// Every incident triangle already has acceptable angles.
    AcceptableAngles,
    /// The chosen strategy produced no motion.
    ZeroDisplacement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmoothingDecision {
    Skip(SkipReason),
    Smooth(DisplacementStrategy),
}

impl<'a> LocalGeometry<'a> {
    fn incident_triangles(&self) -> &'a [usize] {
        self.mesh.vertex_triangles(self.vertex)
    }

    /// Decide whether and how to smooth this vertex.
    pub fn select_strategy(&self) -> SmoothingDecision {
        let (mesh, v) = (self.mesh, self.vertex);

        if mesh.vertex_is_deleted(v) {
            return SmoothingDecision::Skip(SkipReason::Deleted);
        }
        let incident = self.incident_triangles();
        if incident.is_empty() {
            return SmoothingDecision::Skip(SkipReason::Isolated);
        }
        if mesh.vertex_edges(v).iter().any(|&e| mesh.edge_is_boundary(e)) {
            return SmoothingDecision::Skip(SkipReason::BoundaryEdge);
        }

        let worth_smoothing = incident.iter().any(|&t| {
            mesh.triangle_has_bad_angle(
                t,
                self.params.trigger_min_angle_cosine,
                self.params.trigger_max_angle_cosine,
            )
        });
        if !worth_smoothing {
            return SmoothingDecision::Skip(SkipReason::AcceptableAngles);
        }

        if self.params.aggressive_mode {
            return SmoothingDecision::Smooth(DisplacementStrategy::Naive);
        }

        let fold = self.params.sharp_fold_regularization_threshold;
        if has_folded_feature(mesh, self.cache, v, fold) {
            if let Some((region, angle)) = sharpest_region(mesh, self.cache, v) {
                if PI - angle < fold {
                    // Only the sharp region's sheet: its tangent plane pulls the
                    // fold open instead of flattening it further.
                    let triangles: Vec<usize> = incident
                        .iter()
                        .copied()
                        .filter(|&t| mesh.triangle_label(t).contains(&region))
                        .collect();
                    return SmoothingDecision::Smooth(DisplacementStrategy::NullSpace { triangles });
                }
            }
        }

        SmoothingDecision::Smooth(DisplacementStrategy::Dihedral)
    }

    /// Area-weighted centroid offset over `triangles`, `None` if they have no area.
    pub fn area_weighted_offset(&self, triangles: &[usize]) -> Option<Vector3<Real>> {
        let position = self.mesh.position(self.vertex);
        let mut sum_areas = 0.0;
        let mut offset = Vector3::zeros();

        for &t in triangles {
            let area = self.cache.area(t);
            sum_areas += area;
            offset += (self.cache.centroid(t) - position) * area;
        }

        if sum_areas <= 0.0 {
            return None;
        }
        Some(offset / sum_areas)
    }

    fn decompose(&self, triangles: &[usize]) -> SmoothingResult<QuadricEigen> {
        let quadric = medial_quadric(
            triangles
                .iter()
                .map(|&t| (self.cache.normal(t), self.cache.area(t))),
        );
        self.solver
            .decompose(&quadric)
            .ok_or_else(|| SmoothingError::EigenDecompositionFailed {
                vertex: self.vertex,
                triangles: triangles.to_vec(),
            })
    }

    /// Project the centroid offset onto the quadric null space of `triangles`.
    pub fn null_space_displacement(&self, triangles: &[usize]) -> SmoothingResult<Vector3<Real>> {
        let Some(offset) = self.area_weighted_offset(triangles) else {
            return Ok(Vector3::zeros());
        };

        let eigen = self.decompose(triangles)?;
        let basis = eigen.null_space_basis(self.params.rank_ratio);
        Ok(projection_matrix(&basis) * offset)
    }

    /// Feature-aware displacement: tangential on smooth patches, along the
    /// crease on ridges, zero at corners.
    pub fn dihedral_displacement(&self, triangles: &[usize]) -> SmoothingResult<Vector3<Real>> {
        let class = classify_vertex(
            self.mesh,
            self.cache,
            self.vertex,
            self.params.feature_edge_angle_threshold,
        );
        if let VertexClass::Corner { .. } = class {
            return Ok(Vector3::zeros());
        }

        let Some(offset) = self.area_weighted_offset(triangles) else {
            return Ok(Vector3::zeros());
        };
        let eigen = self.decompose(triangles)?;

        match class {
            VertexClass::Smooth => {
                let b = triangles
                    .iter()
                    .fold(Vector3::zeros(), |acc, &t| acc + self.cache.normal(t) * self.cache.area(t));
                match eigen.jiao_normal(&b, self.params.rank_ratio) {
                    Some(normal) => Ok(offset - normal * normal.dot(&offset)),
                    None => {
                        if self.params.verbose {
                            debug!(vertex = self.vertex, "medial quadric has no dominant direction");
                        }
                        Ok(Vector3::zeros())
                    },
                }
            },
            VertexClass::Ridge { feature_edges } => {
                let tangent = if eigen.ridge_is_well_conditioned() {
                    eigen.min_vector()
                } else {
                    ridge_direction_from_edges(self.mesh, &feature_edges).ok_or(
                        SmoothingError::RidgeDirectionUnavailable {
                            vertex: self.vertex,
                            feature_edges: feature_edges.len(),
                        },
                    )?
                };
                Ok(tangent * tangent.dot(&offset))
            },
            VertexClass::Corner { .. } => Ok(Vector3::zeros()),
        }
    }

    /// Unconstrained area-weighted Laplacian.
    pub fn naive_displacement(&self, triangles: &[usize]) -> Vector3<Real> {
        self.area_weighted_offset(triangles)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Run `strategy` over the triangles it applies to.
    pub fn displacement(&self, strategy: &DisplacementStrategy) -> SmoothingResult<Vector3<Real>> {
        match strategy {
            DisplacementStrategy::NullSpace { triangles } => self.null_space_displacement(triangles),
            DisplacementStrategy::Dihedral => self.dihedral_displacement(self.incident_triangles()),
            DisplacementStrategy::Naive => Ok(self.naive_displacement(self.incident_triangles())),
        }
    }
}

/// Overwrite the displacement components of pinned axes.
pub fn apply_pinned_axes(
    mut displacement: Vector3<Real>,
    solid: [bool; 3],
    policy: PinnedAxisPolicy,
) -> Vector3<Real> {
    for axis in 0..3 {
        if solid[axis] {
            displacement[axis] = policy.pinned_value(axis);
        }
    }
    displacement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_axes_index_constant() {
        let d = Vector3::new(0.5, 0.5, 0.5);
        let pinned = apply_pinned_axes(d, [true, true, true], PinnedAxisPolicy::IndexConstant);
        assert_eq!(pinned, Vector3::new(0.0, 1.0, 2.0));
        let partial = apply_pinned_axes(d, [false, true, false], PinnedAxisPolicy::IndexConstant);
        assert_eq!(partial, Vector3::new(0.5, 1.0, 0.5));
    }

    #[test]
    fn pinned_axes_zero() {
        let d = Vector3::new(0.5, 0.5, 0.5);
        let pinned = apply_pinned_axes(d, [false, true, true], PinnedAxisPolicy::Zero);
        assert_eq!(pinned, Vector3::new(0.5, 0.0, 0.0));
    }
}
