//! Static distance queries between mesh primitives

use crate::float_types::{
    Real,
    parry3d::{
        query::PointQueryWithLocation,
        shape::Triangle,
    },
};
use nalgebra::{Point3, Vector3};

/// Closest approach of a point to a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTriangleProximity {
    pub distance: Real,
    /// Barycentric coordinates of the closest point on the triangle.
    pub barycentric: [Real; 3],
    /// Unit vector from the closest point towards the query point, or the
    /// triangle normal when the point lies on the triangle.
    pub normal: Vector3<Real>,
}

/// Closest approach of two segments `a0 a1` and `b0 b1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeEdgeProximity {
    pub distance: Real,
    /// Parameter of the closest point along `a0 -> a1`.
    pub s: Real,
    /// Parameter of the closest point along `b0 -> b1`.
    pub t: Real,
    /// Unit vector from the second segment towards the first.
    pub normal: Vector3<Real>,
}

fn triangle_is_degenerate(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> bool {
    let (ab, ac) = (b - a, c - a);
    let scale = ab.norm_squared().max(ac.norm_squared()).max((c - b).norm_squared());
    ab.cross(&ac).norm() <= Real::EPSILON * scale
}

/// Distance from `p` to triangle `abc`.
///
/// Non-degenerate triangles go through parry's Voronoi-region projection.
/// Collapsed triangles are treated as the union of their three edges.
pub fn point_triangle_proximity(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> PointTriangleProximity {
    if triangle_is_degenerate(a, b, c) {
        return degenerate_point_triangle_proximity(p, a, b, c);
    }

    let triangle = Triangle::new(*a, *b, *c);
    let (projection, location) = triangle.project_local_point_and_get_location(p, false);
    let barycentric = location
        .barycentric_coordinates()
        .unwrap_or_else(|| barycentric_of(&projection.point, a, b, c));

    let offset = p - projection.point;
    let distance = offset.norm();
    let normal = offset.try_normalize(Real::MIN_POSITIVE).unwrap_or_else(|| {
        (b - a)
            .cross(&(c - a))
            .try_normalize(Real::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros)
    });

    PointTriangleProximity {
        distance,
        barycentric,
        normal,
    }
}

/// Barycentric coordinates of a point assumed to lie in the plane of `abc`.
fn barycentric_of(q: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> [Real; 3] {
    let (v0, v1, v2) = (b - a, c - a, q - a);
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom == 0.0 {
        return [1.0, 0.0, 0.0];
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    [1.0 - v - w, v, w]
}

fn degenerate_point_triangle_proximity(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> PointTriangleProximity {
    let corners = [a, b, c];
    let hits = [0, 1, 2].map(|i| edge_edge_proximity(p, p, corners[i], corners[(i + 1) % 3]));

    let mut i = 0;
    for k in 1..3 {
        if hits[k].distance < hits[i].distance {
            i = k;
        }
    }
    let j = (i + 1) % 3;

    let mut barycentric = [0.0; 3];
    barycentric[i] = 1.0 - hits[i].t;
    barycentric[j] += hits[i].t;

    PointTriangleProximity {
        distance: hits[i].distance,
        barycentric,
        normal: hits[i].normal,
    }
}

/// Closest points between segments `a0 a1` and `b0 b1`.
///
/// Either segment may be collapsed to a point.
pub fn edge_edge_proximity(
    a0: &Point3<Real>,
    a1: &Point3<Real>,
    b0: &Point3<Real>,
    b1: &Point3<Real>,
) -> EdgeEdgeProximity {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let r = a0 - b0;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= Real::EPSILON && e <= Real::EPSILON {
        (0.0, 0.0)
    } else if a <= Real::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= Real::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    let on_a = a0 + d1 * s;
    let on_b = b0 + d2 * t;
    let offset = on_a - on_b;
    let normal = offset
        .try_normalize(Real::MIN_POSITIVE)
        .or_else(|| d1.cross(&d2).try_normalize(Real::MIN_POSITIVE))
        .unwrap_or_else(Vector3::zeros);

    EdgeEdgeProximity {
        distance: offset.norm(),
        s,
        t,
        normal,
    }
}
