//! `SurfaceMesh`: the mutable triangle-mesh state a smoothing pass operates on

use crate::errors::{SmoothingError, SmoothingResult};
use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

pub mod connectivity;
pub mod quality;

pub use connectivity::Connectivity;

/// Region label pair used when a caller does not supply labels.
pub const DEFAULT_LABEL: [i32; 2] = [0, 1];

/// Indexed triangle mesh with per-vertex committed and tentative positions.
///
/// Incidence maps are built once at construction and exposed as read-only
/// slices. Positions are the only thing a smoothing pass changes.
///
/// A triangle `[a, b, c]` with `a == b` is a tombstone left behind by a
/// topological edit; it keeps its slot so triangle ids stay stable.
///
/// Region labels: the right-handed normal of a triangle points from the
/// region `label[1]` into the region `label[0]`.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    positions: Vec<Point3<Real>>,
    new_positions: Vec<Point3<Real>>,
    triangles: Vec<[usize; 3]>,
    labels: Vec<[i32; 2]>,
    solid: Vec<[bool; 3]>,
    deleted: Vec<bool>,
    connectivity: Connectivity,
}

impl SurfaceMesh {
    /// Build a mesh from positions and triangles, every triangle labelled [`DEFAULT_LABEL`].
    pub fn new(positions: Vec<Point3<Real>>, triangles: Vec<[usize; 3]>) -> SmoothingResult<Self> {
        let labels = vec![DEFAULT_LABEL; triangles.len()];
        Self::with_labels(positions, triangles, labels)
    }

    /// Build a mesh with explicit region labels, one pair per triangle.
    pub fn with_labels(
        positions: Vec<Point3<Real>>,
        triangles: Vec<[usize; 3]>,
        labels: Vec<[i32; 2]>,
    ) -> SmoothingResult<Self> {
        if labels.len() != triangles.len() {
            return Err(SmoothingError::LabelCountMismatch {
                labels: labels.len(),
                triangles: triangles.len(),
            });
        }

        let vertex_count = positions.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v >= vertex_count) {
                return Err(SmoothingError::InvalidTriangle {
                    triangle,
                    vertex,
                    vertex_count,
                });
            }
        }

        let connectivity = Connectivity::build(vertex_count, &triangles);

        Ok(SurfaceMesh {
            new_positions: positions.clone(),
            positions,
            triangles,
            labels,
            solid: vec![[false; 3]; vertex_count],
            deleted: vec![false; vertex_count],
            connectivity,
        })
    }

    fn check_vertex(&self, vertex: usize) -> SmoothingResult<()> {
        if vertex >= self.positions.len() {
            return Err(SmoothingError::VertexOutOfRange {
                vertex,
                vertex_count: self.positions.len(),
            });
        }
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Topology
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn num_edges(&self) -> usize {
        self.connectivity.num_edges()
    }

    pub fn triangle(&self, t: usize) -> [usize; 3] {
        self.triangles[t]
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Tombstoned triangles have their first two indices equal.
    pub fn triangle_is_deleted(&self, t: usize) -> bool {
        let tri = self.triangles[t];
        tri[0] == tri[1]
    }

    pub fn triangle_label(&self, t: usize) -> [i32; 2] {
        self.labels[t]
    }

    /// Endpoints of edge `e`, smaller index first.
    pub fn edge(&self, e: usize) -> [usize; 2] {
        self.connectivity.edges[e]
    }

    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        self.connectivity.find_edge(a, b)
    }

    pub fn vertex_triangles(&self, v: usize) -> &[usize] {
        &self.connectivity.vertex_to_triangles[v]
    }

    pub fn vertex_edges(&self, v: usize) -> &[usize] {
        &self.connectivity.vertex_to_edges[v]
    }

    pub fn edge_triangles(&self, e: usize) -> &[usize] {
        &self.connectivity.edge_to_triangles[e]
    }

    /// An edge with exactly one incident triangle.
    pub fn edge_is_boundary(&self, e: usize) -> bool {
        self.edge_triangles(e).len() == 1
    }

    /// Whether triangle `t` traverses `a -> b` in its winding order.
    pub fn triangle_traverses(&self, t: usize, a: usize, b: usize) -> bool {
        let tri = self.triangles[t];
        (0..3).any(|i| tri[i] == a && tri[(i + 1) % 3] == b)
    }

    pub fn vertex_is_deleted(&self, v: usize) -> bool {
        self.deleted[v]
    }

    /// Flag a vertex as removed by a topological edit.
    pub fn mark_vertex_deleted(&mut self, v: usize) -> SmoothingResult<()> {
        self.check_vertex(v)?;
        self.deleted[v] = true;
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Solid (pinned) axes
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    /// Pin individual axes of a vertex.
    pub fn set_vertex_solid(&mut self, v: usize, solid: [bool; 3]) -> SmoothingResult<()> {
        self.check_vertex(v)?;
        self.solid[v] = solid;
        Ok(())
    }

    pub fn vertex_is_solid_3(&self, v: usize) -> [bool; 3] {
        self.solid[v]
    }

    pub fn vertex_is_all_solid(&self, v: usize) -> bool {
        self.solid[v].iter().all(|&s| s)
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Positions
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    pub fn position(&self, v: usize) -> Point3<Real> {
        self.positions[v]
    }

    pub fn positions(&self) -> &[Point3<Real>] {
        &self.positions
    }

    pub fn new_position(&self, v: usize) -> Point3<Real> {
        self.new_positions[v]
    }

    /// Commit a position. The tentative position follows so that collision
    /// queries see every other vertex at rest.
    pub fn set_position(&mut self, v: usize, position: Point3<Real>) {
        self.positions[v] = position;
        self.new_positions[v] = position;
    }

    /// Set only the tentative position used by collision queries.
    pub fn set_new_position(&mut self, v: usize, position: Point3<Real>) {
        self.new_positions[v] = position;
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Triangle geometry
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    fn triangle_cross(&self, t: usize) -> Vector3<Real> {
        let [a, b, c] = self.triangles[t];
        let pa = self.positions[a];
        (self.positions[b] - pa).cross(&(self.positions[c] - pa))
    }

    /// Area of triangle `t`, zero for tombstones.
    pub fn triangle_area(&self, t: usize) -> Real {
        if self.triangle_is_deleted(t) {
            return 0.0;
        }
        0.5 * self.triangle_cross(t).norm()
    }

    /// Unit normal of triangle `t`, zero for tombstones and zero-area triangles.
    pub fn triangle_normal(&self, t: usize) -> Vector3<Real> {
        if self.triangle_is_deleted(t) {
            return Vector3::zeros();
        }
        self.triangle_cross(t)
            .try_normalize(Real::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Centroid of triangle `t`, the origin for tombstones.
    pub fn triangle_centroid(&self, t: usize) -> Point3<Real> {
        if self.triangle_is_deleted(t) {
            return Point3::origin();
        }
        let [a, b, c] = self.triangles[t];
        Point3::from((self.positions[a].coords + self.positions[b].coords + self.positions[c].coords) / 3.0)
    }

    /// Normal of triangle `t` oriented to point away from `region`.
    ///
    /// `region` must be one of the triangle's two labels; any other region gets
    /// the unflipped normal.
    pub fn triangle_normal_by_region(&self, t: usize, region: i32) -> Vector3<Real> {
        let normal = self.triangle_normal(t);
        if self.labels[t][0] == region { -normal } else { normal }
    }

    /// Same orientation rule as [`Self::triangle_normal_by_region`] applied to an externally cached normal.
    pub fn orient_normal_by_region(&self, t: usize, region: i32, normal: Vector3<Real>) -> Vector3<Real> {
        if self.labels[t][0] == region { -normal } else { normal }
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Edge lengths
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    pub fn edge_length(&self, e: usize) -> Real {
        let [a, b] = self.connectivity.edges[e];
        (self.positions[b] - self.positions[a]).norm()
    }

    /// Longest edge in the mesh, zero if there are no edges.
    pub fn max_edge_length(&self) -> Real {
        (0..self.num_edges())
            .map(|e| self.edge_length(e))
            .fold(0.0, Real::max)
    }

    /// Mean edge length, zero if there are no edges.
    pub fn average_edge_length(&self) -> Real {
        let n = self.num_edges();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|e| self.edge_length(e)).sum::<Real>() / n as Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn rejects_out_of_range_triangles() {
        let err = SurfaceMesh::new(vec![Point3::origin(); 2], vec![[0, 1, 2]]).unwrap_err();
        assert_eq!(
            err,
            SmoothingError::InvalidTriangle {
                triangle: 0,
                vertex: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn rejects_label_mismatch() {
        let err = SurfaceMesh::with_labels(vec![Point3::origin(); 3], vec![[0, 1, 2]], vec![])
            .unwrap_err();
        assert!(matches!(err, SmoothingError::LabelCountMismatch { .. }));
    }

    #[test]
    fn triangle_geometry() {
        let mesh = unit_triangle();
        assert!((mesh.triangle_area(0) - 0.5).abs() < 1e-12);
        assert_eq!(mesh.triangle_normal(0), Vector3::z());
        let c = mesh.triangle_centroid(0);
        assert!((c - Point3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);
        assert!(mesh.triangle_traverses(0, 1, 2));
        assert!(!mesh.triangle_traverses(0, 2, 1));
    }

    #[test]
    fn region_normals_point_away_from_region() {
        let mesh = unit_triangle();
        assert_eq!(mesh.triangle_normal_by_region(0, 1), Vector3::z());
        assert_eq!(mesh.triangle_normal_by_region(0, 0), -Vector3::z());
    }

    #[test]
    fn set_position_moves_tentative_position_too() {
        let mut mesh = unit_triangle();
        mesh.set_new_position(0, Point3::new(0.1, 0.0, 0.0));
        assert_eq!(mesh.position(0), Point3::origin());
        mesh.set_position(0, Point3::new(0.2, 0.0, 0.0));
        assert_eq!(mesh.new_position(0), Point3::new(0.2, 0.0, 0.0));
    }

    #[test]
    fn solid_flags_are_bounds_checked() {
        let mut mesh = unit_triangle();
        assert!(mesh.set_vertex_solid(7, [true; 3]).is_err());
        mesh.set_vertex_solid(1, [true, false, true]).unwrap();
        assert!(!mesh.vertex_is_all_solid(1));
        mesh.set_vertex_solid(1, [true; 3]).unwrap();
        assert!(mesh.vertex_is_all_solid(1));
    }

    #[test]
    fn edge_length_statistics() {
        let mesh = unit_triangle();
        assert!((mesh.max_edge_length() - (2.0 as Real).sqrt()).abs() < 1e-12);
        let expected = (2.0 + (2.0 as Real).sqrt()) / 3.0;
        assert!((mesh.average_edge_length() - expected).abs() < 1e-12);
    }
}
