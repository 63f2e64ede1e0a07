//! Smoothing pass driver
//!
//! A pass builds the triangle cache, then visits vertices one at a time. Each
//! accepted move is committed and the cache refreshed before the next vertex
//! is evaluated, so the sweep is a Gauss-Seidel iteration and stays sequential
//! even with the `parallel` feature.

use crate::collision::{CollisionPipeline, SweptAabbPipeline};
use crate::errors::SmoothingError;
use crate::float_types::{Real, tolerance};
use crate::mesh::SurfaceMesh;
use crate::params::SmoothingParams;
use crate::quadric::{NalgebraEigenSolver, SymmetricEigenSolver};
use crate::smoothing::cache::TriangleCache;
use crate::smoothing::safety::pseudo_motion_violation;
use crate::smoothing::strategy::{LocalGeometry, SkipReason, SmoothingDecision, apply_pinned_axes};
use crate::smoothing::traits::MeshEventListener;
use nalgebra::Vector3;
use tracing::{debug, error, info, info_span, trace, warn};

/// Result of visiting one vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexOutcome {
    Skipped(SkipReason),
    /// Displacement computation failed; the vertex stays put.
    Failed(SmoothingError),
    /// Longer than twice the edge-length bound.
    RejectedHuge(Vector3<Real>),
    /// Refused by the collision safety gate.
    RejectedCollision(Vector3<Real>),
    Moved(Vector3<Real>),
}

impl VertexOutcome {
    /// The displacement actually applied to the vertex.
    pub fn displacement(&self) -> Vector3<Real> {
        match self {
            VertexOutcome::Moved(d) => *d,
            _ => Vector3::zeros(),
        }
    }
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PassStatus {
    /// Every eligible vertex was visited.
    Completed,
}

/// Summary of one smoothing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingReport {
    pub status: PassStatus,
    /// Vertices handed to the per-vertex step, in visit order.
    pub smoothed_vertices: Vec<usize>,
    /// Applied displacement per vertex, zero for vertices that did not move.
    pub displacements: Vec<Vector3<Real>>,
    pub moved: usize,
    pub rejected_collision: usize,
    pub rejected_huge: usize,
    pub failed: usize,
    pub max_displacement: Real,
}

impl SmoothingReport {
    fn new(num_vertices: usize) -> Self {
        Self {
            status: PassStatus::Completed,
            smoothed_vertices: Vec::new(),
            displacements: vec![Vector3::zeros(); num_vertices],
            moved: 0,
            rejected_collision: 0,
            rejected_huge: 0,
            failed: 0,
            max_displacement: 0.0,
        }
    }

    pub fn completed(&self) -> bool {
        self.status == PassStatus::Completed
    }

    fn record(&mut self, v: usize, outcome: &VertexOutcome) {
        self.smoothed_vertices.push(v);
        match outcome {
            VertexOutcome::Skipped(_) => {},
            VertexOutcome::Failed(_) => self.failed += 1,
            VertexOutcome::RejectedHuge(_) => self.rejected_huge += 1,
            VertexOutcome::RejectedCollision(_) => self.rejected_collision += 1,
            VertexOutcome::Moved(d) => {
                self.moved += 1;
                self.displacements[v] = *d;
                self.max_displacement = self.max_displacement.max(d.norm());
            },
        }
    }
}

/// Vertex-relocation driver for a [`SurfaceMesh`].
pub struct MeshSmoother {
    params: SmoothingParams,
    pipeline: Box<dyn CollisionPipeline>,
    solver: Box<dyn SymmetricEigenSolver>,
    listener: Option<Box<dyn MeshEventListener>>,
}

impl MeshSmoother {
    /// A smoother with the swept-AABB collision pipeline and nalgebra's eigen solver.
    pub fn new(params: SmoothingParams) -> Self {
        let margin = 2.0 * params.improve_collision_epsilon.max(tolerance());
        Self {
            params,
            pipeline: Box::new(SweptAabbPipeline::new(margin)),
            solver: Box::new(NalgebraEigenSolver::default()),
            listener: None,
        }
    }

    pub fn with_collision_pipeline(mut self, pipeline: impl CollisionPipeline + 'static) -> Self {
        self.pipeline = Box::new(pipeline);
        self
    }

    pub fn with_eigen_solver(mut self, solver: impl SymmetricEigenSolver + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    pub fn with_event_listener(mut self, listener: impl MeshEventListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn params(&self) -> &SmoothingParams {
        &self.params
    }

    /// Compute, validate and commit the displacement of one vertex.
    ///
    /// `max_edge_length` bounds the displacement at twice its value. On
    /// success the new position is committed, `cache` refreshed and the
    /// collision pipeline told about the move; on any rejection the committed
    /// and tentative positions are left unchanged.
    pub fn null_space_smooth_vertex(
        &mut self,
        mesh: &mut SurfaceMesh,
        cache: &mut TriangleCache,
        v: usize,
        max_edge_length: Real,
    ) -> VertexOutcome {
        let geometry = LocalGeometry {
            mesh: &*mesh,
            cache: &*cache,
            params: &self.params,
            solver: self.solver.as_ref(),
            vertex: v,
        };

        let strategy = match geometry.select_strategy() {
            SmoothingDecision::Skip(reason) => return VertexOutcome::Skipped(reason),
            SmoothingDecision::Smooth(strategy) => strategy,
        };
        if self.params.verbose {
            debug!(vertex = v, ?strategy, "smoothing vertex");
        }

        let displacement = match geometry.displacement(&strategy) {
            Ok(d) => d,
            Err(err) => {
                error!(vertex = v, %err, "displacement computation failed");
                return VertexOutcome::Failed(err);
            },
        };
        let displacement = apply_pinned_axes(
            displacement,
            mesh.vertex_is_solid_3(v),
            self.params.pinned_axis_policy,
        );

        if displacement.norm() > 2.0 * max_edge_length {
            warn!(vertex = v, length = displacement.norm(), max_edge_length, "huge displacement request");
            return VertexOutcome::RejectedHuge(displacement);
        }
        if displacement == Vector3::zeros() {
            return VertexOutcome::Skipped(SkipReason::ZeroDisplacement);
        }

        let position = mesh.position(v);
        let target = position + displacement;
        mesh.set_new_position(v, target);

        if self.params.collision_safety {
            let violation = pseudo_motion_violation(
                mesh,
                self.pipeline.as_ref(),
                v,
                self.params.improve_collision_epsilon,
            );
            if let Some(violation) = violation {
                trace!(vertex = v, ?violation, "smoothing move rejected");
                mesh.set_new_position(v, position);
                return VertexOutcome::RejectedCollision(displacement);
            }
        }

        cache.commit_position(mesh, v, target, self.params.verbose);
        self.pipeline.vertex_moved(mesh, v);
        VertexOutcome::Moved(displacement)
    }

    /// Run one smoothing pass over the whole mesh.
    ///
    /// `dt` is accepted for interface compatibility with the simulation
    /// driver and does not affect the result.
    pub fn null_space_smoothing_pass(&mut self, mesh: &mut SurfaceMesh, dt: Real) -> SmoothingReport {
        let span = info_span!(
            "null_space_smoothing_pass",
            vertices = mesh.num_vertices(),
            triangles = mesh.num_triangles(),
            aggressive = self.params.aggressive_mode,
        );
        let _guard = span.enter();
        info!(dt, "smoothing pass started");

        let mut cache = TriangleCache::build(mesh, self.params.verbose);
        let max_edge_length = self
            .params
            .max_edge_length
            .unwrap_or_else(|| mesh.max_edge_length());
        let mut report = SmoothingReport::new(mesh.num_vertices());
        if self.params.collision_safety {
            self.pipeline.rebuild(mesh);
        }

        if self.params.aggressive_mode {
            let mut visited = vec![false; mesh.num_vertices()];
            for t in 0..mesh.num_triangles() {
                let bad = mesh.triangle_has_bad_angle(
                    t,
                    self.params.min_angle_cosine,
                    self.params.max_angle_cosine,
                );
                if !bad {
                    continue;
                }
                for v in mesh.triangle(t) {
                    if visited[v] || mesh.vertex_is_all_solid(v) {
                        continue;
                    }
                    visited[v] = true;
                    let outcome = self.null_space_smooth_vertex(mesh, &mut cache, v, max_edge_length);
                    report.record(v, &outcome);
                }
            }
        } else {
            for v in 0..mesh.num_vertices() {
                if mesh.vertex_is_all_solid(v) {
                    continue;
                }
                let outcome = self.null_space_smooth_vertex(mesh, &mut cache, v, max_edge_length);
                report.record(v, &outcome);
            }
        }

        info!(
            moved = report.moved,
            rejected_collision = report.rejected_collision,
            rejected_huge = report.rejected_huge,
            failed = report.failed,
            max_displacement = report.max_displacement,
            "smoothing pass completed"
        );

        if let Some(listener) = self.listener.as_mut() {
            listener.smoothing(mesh);
        }

        report
    }
}
