//! Largest uniform fraction of a displacement field that keeps every triangle
//! from inverting.
//!
//! For triangle `x₁x₂x₃` displaced by `u₁u₂u₃`, the scaled normal after a step
//! `β` is `n(β) = c₀ + β c₁ + β² c₂` with
//! ```text
//! c₀ = (x₂ − x₁) × (x₃ − x₁)
//! c₁ = (x₂ − x₁) × (u₃ − u₁) − (x₃ − x₁) × (u₂ − u₁)
//! c₂ = (u₂ − u₁) × (u₃ − u₁)
//! ```
//! The triangle flips when `c₀ · n(β)` changes sign, so the step is bounded by
//! the smallest non-negative root of `(c₀·c₂) β² + (c₀·c₁) β + c₀·c₀`.

use crate::errors::{SmoothingError, SmoothingResult};
use crate::float_types::{Real, TINY_TRIANGLE_AREA_SQUARED};
use crate::mesh::SurfaceMesh;
use nalgebra::Vector3;
use tracing::debug;

/// Each tightening of the bound keeps this fraction of the root.
pub const STEP_SAFETY_FACTOR: Real = 0.99;

/// Linear coefficients smaller than this are treated as zero.
const NEGLIGIBLE_COEFFICIENT: Real = 1e-14;

/// Coefficients `[a, b, c]` of the orientation quadratic of triangle `t`.
fn orientation_quadratic(mesh: &SurfaceMesh, t: usize, displacements: &[Vector3<Real>]) -> [Real; 3] {
    let [i1, i2, i3] = mesh.triangle(t);
    let (x1, x2, x3) = (mesh.position(i1), mesh.position(i2), mesh.position(i3));
    let (u1, u2, u3) = (displacements[i1], displacements[i2], displacements[i3]);

    let c0 = (x2 - x1).cross(&(x3 - x1));
    let c1 = (x2 - x1).cross(&(u3 - u1)) - (x3 - x1).cross(&(u2 - u1));
    let c2 = (u2 - u1).cross(&(u3 - u1));

    [c0.dot(&c2), c0.dot(&c1), c0.dot(&c0)]
}

/// Smallest non-negative root of `aβ² + bβ + c`, or 1 when there is none.
fn first_inversion(t: usize, [a, b, c]: [Real; 3], verbose: bool) -> Real {
    if a == 0.0 {
        if b.abs() > NEGLIGIBLE_COEFFICIENT && -c / b >= 0.0 {
            return -c / b;
        }
        if verbose && b.abs() < NEGLIGIBLE_COEFFICIENT {
            debug!(triangle = t, b, "orientation quadratic is constant");
        }
        return 1.0;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        if verbose {
            debug!(triangle = t, discriminant, "orientation quadratic has no real root");
        }
        return 1.0;
    }

    // Numerically stable pair of roots.
    let q = if b > 0.0 {
        -0.5 * (b + discriminant.sqrt())
    } else {
        -0.5 * (b - discriminant.sqrt())
    };
    let (beta_1, beta_2) = (q / a, c / q);

    match (beta_1 >= 0.0, beta_2 >= 0.0) {
        (false, false) => 1.0,
        (false, true) => beta_2,
        (true, false) => beta_1,
        (true, true) => beta_1.min(beta_2),
    }
}

/// Largest `β ≤ 1` such that moving every vertex `i` by `β · displacements[i]`
/// flips no live triangle.
///
/// Each time a triangle tightens the bound it is set to
/// [`STEP_SAFETY_FACTOR`] times that triangle's root.
pub fn max_inversion_free_step(
    mesh: &SurfaceMesh,
    displacements: &[Vector3<Real>],
    verbose: bool,
) -> SmoothingResult<Real> {
    if displacements.len() != mesh.num_vertices() {
        return Err(SmoothingError::DisplacementCountMismatch {
            displacements: displacements.len(),
            vertices: mesh.num_vertices(),
        });
    }

    let mut max_beta: Real = 1.0;

    for t in 0..mesh.num_triangles() {
        if mesh.triangle_is_deleted(t) {
            continue;
        }

        let quadratic = orientation_quadratic(mesh, t, displacements);
        if verbose && quadratic[2] < TINY_TRIANGLE_AREA_SQUARED {
            debug!(triangle = t, area_squared = quadratic[2], "super small triangle");
        }

        let beta = first_inversion(t, quadratic, verbose);
        if beta < max_beta {
            max_beta = STEP_SAFETY_FACTOR * beta;
            if verbose {
                let [a, b, c] = quadratic;
                debug!(triangle = t, max_beta, a, b, c, "tightened inversion-free step");
            }
        }
    }

    Ok(max_beta)
}
