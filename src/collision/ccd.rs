//! Continuous collision tests for linearly moving primitives
//!
//! **Mathematical Foundation: Coplanarity Cubic**
//!
//! Four points moving linearly over `t ∈ [0, 1]` can only touch when they are
//! coplanar. With `u`, `v`, `w` the three difference vectors from a reference
//! point, coplanarity is
//! ```text
//! f(t) = w(t) · (u(t) × v(t)) = c₀ + c₁t + c₂t² + c₃t³ = 0
//! ```
//! Each root of `f` in `[0, 1]` (and each tangency, where `f'` vanishes) is a
//! candidate contact time, confirmed by a static proximity query against
//! [`tolerance`]. Pairs that stay coplanar for the whole step are sampled.

use crate::collision::proximity::{edge_edge_proximity, point_triangle_proximity};
use crate::float_types::{Real, tolerance};
use nalgebra::{Point3, Vector3};

const BISECTION_ITERATIONS: usize = 64;
const COPLANAR_SAMPLES: usize = 16;

/// A vertex moving linearly from `start` at `t = 0` to `end` at `t = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: Point3<Real>,
    pub end: Point3<Real>,
}

impl Sweep {
    pub const fn new(start: Point3<Real>, end: Point3<Real>) -> Self {
        Self { start, end }
    }

    pub fn at(&self, t: Real) -> Point3<Real> {
        self.start + (self.end - self.start) * t
    }

    fn motion(&self) -> Vector3<Real> {
        self.end - self.start
    }
}

/// Difference vector `to - from` as a start value and a rate.
fn relative(from: &Sweep, to: &Sweep) -> (Vector3<Real>, Vector3<Real>) {
    (to.start - from.start, to.motion() - from.motion())
}

/// Coefficients `[c₀, c₁, c₂, c₃]` of `w(t) · (u(t) × v(t))`.
pub fn coplanarity_coefficients(
    (u0, du): (Vector3<Real>, Vector3<Real>),
    (v0, dv): (Vector3<Real>, Vector3<Real>),
    (w0, dw): (Vector3<Real>, Vector3<Real>),
) -> [Real; 4] {
    let uxv0 = u0.cross(&v0);
    let uxv1 = u0.cross(&dv) + du.cross(&v0);
    let uxv2 = du.cross(&dv);

    [
        w0.dot(&uxv0),
        w0.dot(&uxv1) + dw.dot(&uxv0),
        w0.dot(&uxv2) + dw.dot(&uxv1),
        dw.dot(&uxv2),
    ]
}

#[inline]
fn evaluate(c: &[Real; 4], t: Real) -> Real {
    ((c[3] * t + c[2]) * t + c[1]) * t + c[0]
}

/// Interior points of `(0, 1)` where the cubic's derivative vanishes, ascending.
fn critical_points(c: &[Real; 4]) -> Vec<Real> {
    let (a, b, k) = (3.0 * c[3], 2.0 * c[2], c[1]);
    let mut points = Vec::with_capacity(2);

    if a == 0.0 {
        if b != 0.0 {
            points.push(-k / b);
        }
    } else {
        let disc = b * b - 4.0 * a * k;
        if disc >= 0.0 {
            let sqrt = disc.sqrt();
            points.push((-b - sqrt) / (2.0 * a));
            points.push((-b + sqrt) / (2.0 * a));
        }
    }

    points.retain(|t| *t > 0.0 && *t < 1.0);
    points.sort_by(|x, y| x.total_cmp(y));
    points
}

/// Roots of the cubic in `[0, 1]`, ascending.
///
/// The interval is split at the critical points so that each piece is
/// monotone, then every sign change is isolated by bisection.
pub fn cubic_roots_in_unit_interval(c: &[Real; 4]) -> Vec<Real> {
    let mut breaks = vec![0.0];
    breaks.extend(critical_points(c));
    breaks.push(1.0);

    let mut roots = Vec::new();
    for pair in breaks.windows(2) {
        let (mut lo, mut hi) = (pair[0], pair[1]);
        let (mut f_lo, f_hi) = (evaluate(c, lo), evaluate(c, hi));

        if f_lo == 0.0 {
            roots.push(lo);
            continue;
        }
        if f_lo * f_hi > 0.0 || f_hi == 0.0 {
            continue;
        }

        for _ in 0..BISECTION_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let f_mid = evaluate(c, mid);
            if f_mid == 0.0 {
                lo = mid;
                hi = mid;
                break;
            }
            if (f_mid < 0.0) == (f_lo < 0.0) {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        roots.push(0.5 * (lo + hi));
    }

    if evaluate(c, 1.0) == 0.0 {
        roots.push(1.0);
    }
    roots.dedup();
    roots
}

/// Times worth a proximity check: cubic roots and tangencies, or a uniform
/// sampling when the four points stay coplanar throughout.
fn contact_candidate_times(c: &[Real; 4], scale: Real) -> Vec<Real> {
    let threshold = 16.0 * Real::EPSILON * scale * scale * scale;
    if c.iter().all(|ci| ci.abs() <= threshold) {
        return (0..=COPLANAR_SAMPLES)
            .map(|k| k as Real / COPLANAR_SAMPLES as Real)
            .collect();
    }

    let mut times = cubic_roots_in_unit_interval(c);
    times.extend(critical_points(c));
    times.sort_by(|x, y| x.total_cmp(y));
    times
}

fn length_scale(vectors: &[Vector3<Real>]) -> Real {
    vectors.iter().map(|v| v.norm()).fold(0.0, Real::max)
}

/// Earliest time in `[0, 1]` at which moving point `p` touches moving triangle `abc`.
pub fn point_triangle_collision(p: &Sweep, a: &Sweep, b: &Sweep, c: &Sweep) -> Option<Real> {
    let u = relative(a, b);
    let v = relative(a, c);
    let w = relative(a, p);
    let coefficients = coplanarity_coefficients(u, v, w);
    let scale = length_scale(&[u.0, u.1, v.0, v.1, w.0, w.1]);

    contact_candidate_times(&coefficients, scale)
        .into_iter()
        .find(|&t| {
            point_triangle_proximity(&p.at(t), &a.at(t), &b.at(t), &c.at(t)).distance <= tolerance()
        })
}

/// Earliest time in `[0, 1]` at which moving edge `a0 a1` touches moving edge `b0 b1`.
pub fn edge_edge_collision(a0: &Sweep, a1: &Sweep, b0: &Sweep, b1: &Sweep) -> Option<Real> {
    let u = relative(a0, a1);
    let v = relative(b0, b1);
    let w = relative(a0, b0);
    let coefficients = coplanarity_coefficients(u, v, w);
    let scale = length_scale(&[u.0, u.1, v.0, v.1, w.0, w.1]);

    contact_candidate_times(&coefficients, scale)
        .into_iter()
        .find(|&t| edge_edge_proximity(&a0.at(t), &a1.at(t), &b0.at(t), &b1.at(t)).distance <= tolerance())
}
