//! Triangle angle quality checks used to decide whether smoothing is worthwhile

use crate::float_types::Real;
use crate::mesh::SurfaceMesh;
use nalgebra::Point3;

/// Interior angle cosines at each corner of the triangle `(a, b, c)`.
///
/// Cosines are used instead of angles to avoid an `acos` per corner. A corner
/// with a zero-length adjacent edge reports a cosine of 1, the worst possible
/// (zero) angle, so that degenerate input is flagged as bad instead of NaN.
pub fn triangle_angle_cosines(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> [Real; 3] {
    fn corner(apex: &Point3<Real>, p: &Point3<Real>, q: &Point3<Real>) -> Real {
        let u = p - apex;
        let v = q - apex;
        let denom = u.norm() * v.norm();
        if denom <= Real::MIN_POSITIVE {
            return 1.0;
        }
        (u.dot(&v) / denom).clamp(-1.0, 1.0)
    }

    [corner(a, b, c), corner(b, c, a), corner(c, a, b)]
}

/// True if any cosine falls outside `[min_cosine, max_cosine]`.
pub fn any_bad_angle_cosine(cosines: &[Real; 3], min_cosine: Real, max_cosine: Real) -> bool {
    cosines.iter().any(|&c| c < min_cosine || c > max_cosine)
}

/// Extreme interior angles over the live triangles of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleStatistics {
    /// Smallest interior angle in radians
    pub min_angle: Real,
    /// Largest interior angle in radians
    pub max_angle: Real,
    /// Live (non-tombstoned) triangles inspected
    pub triangles: usize,
}

impl SurfaceMesh {
    /// Angle cosines of triangle `t` at the current committed positions.
    pub fn triangle_angle_cosines(&self, t: usize) -> [Real; 3] {
        let [a, b, c] = self.triangle(t);
        triangle_angle_cosines(&self.position(a), &self.position(b), &self.position(c))
    }

    /// Whether triangle `t` has an angle outside the given cosine bounds.
    /// Tombstoned triangles never count as bad.
    pub fn triangle_has_bad_angle(&self, t: usize, min_cosine: Real, max_cosine: Real) -> bool {
        if self.triangle_is_deleted(t) {
            return false;
        }
        any_bad_angle_cosine(&self.triangle_angle_cosines(t), min_cosine, max_cosine)
    }

    /// Smallest and largest interior angle over all live triangles.
    pub fn angle_statistics(&self) -> AngleStatistics {
        let mut stats = AngleStatistics {
            min_angle: Real::INFINITY,
            max_angle: 0.0,
            triangles: 0,
        };

        for t in 0..self.num_triangles() {
            if self.triangle_is_deleted(t) {
                continue;
            }
            stats.triangles += 1;
            for cosine in self.triangle_angle_cosines(t) {
                let angle = cosine.clamp(-1.0, 1.0).acos();
                stats.min_angle = stats.min_angle.min(angle);
                stats.max_angle = stats.max_angle.max(angle);
            }
        }

        if stats.triangles == 0 {
            stats.min_angle = 0.0;
        }
        stats
    }
}
