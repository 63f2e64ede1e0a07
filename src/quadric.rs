//! Medial quadric estimation for local surface shape
//!
//! **Mathematical Foundation: Medial Quadric**
//!
//! For a vertex with incident triangles of unit normal `nᵢ` and area `wᵢ`:
//! ```text
//! A = Σ wᵢ · nᵢ nᵢᵀ
//! ```
//! `A` is symmetric positive semi-definite. Its eigenvectors split space into
//! directions constrained by some incident normal (large eigenvalue) and
//! directions in which the vertex can slide without bending the surface
//! (eigenvalue below `rank_ratio · λ_max`, the *null space*):
//! - one dominant eigenvalue: smooth surface, 2D null space
//! - two dominant eigenvalues: ridge, 1D null space along the crease
//! - three dominant eigenvalues: corner, no null space

use crate::float_types::{RIDGE_MID_MAX_RATIO, RIDGE_MIN_MID_RATIO, Real};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

/// Eigen-structure of a quadric, eigenvalues in ascending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadricEigen {
    /// Eigenvalues, `values[0] <= values[1] <= values[2]`
    pub values: [Real; 3],
    /// Unit eigenvectors, `vectors[i]` belongs to `values[i]`
    pub vectors: [Vector3<Real>; 3],
}

impl QuadricEigen {
    /// Sort an unordered eigen-decomposition into ascending order.
    /// Returns `None` if any component is not finite.
    pub fn from_unsorted(values: Vector3<Real>, vectors: Matrix3<Real>) -> Option<Self> {
        if values.iter().chain(vectors.iter()).any(|x| !x.is_finite()) {
            return None;
        }

        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        Some(QuadricEigen {
            values: order.map(|i| values[i]),
            vectors: order.map(|i| vectors.column(i).into_owned()),
        })
    }

    pub const fn min(&self) -> Real {
        self.values[0]
    }

    pub const fn mid(&self) -> Real {
        self.values[1]
    }

    pub const fn max(&self) -> Real {
        self.values[2]
    }

    /// Eigenvector of the smallest eigenvalue.
    pub const fn min_vector(&self) -> Vector3<Real> {
        self.vectors[0]
    }

    /// Eigenvectors whose eigenvalue is below `rank_ratio · λ_max`.
    pub fn null_space_basis(&self, rank_ratio: Real) -> Vec<Vector3<Real>> {
        let cutoff = rank_ratio * self.max();
        self.values
            .iter()
            .zip(self.vectors.iter())
            .filter(|&(&value, _)| value < cutoff)
            .map(|(_, vector)| *vector)
            .collect()
    }

    /// Jiao's medial-quadric normal.
    ///
    /// ```text
    /// d = Σ_{λᵢ > ratio·λ_max} (b·eᵢ) eᵢ / λᵢ
    /// ```
    /// normalized. `None` when `d` vanishes (no significant eigenvalue).
    pub fn jiao_normal(&self, b: &Vector3<Real>, rank_ratio: Real) -> Option<Vector3<Real>> {
        let cutoff = rank_ratio * self.max();
        let mut d = Vector3::zeros();
        for (&value, vector) in self.values.iter().zip(self.vectors.iter()) {
            if value > cutoff {
                d += vector * (b.dot(vector) / value);
            }
        }
        d.try_normalize(Real::MIN_POSITIVE)
    }

    /// The smallest-eigenvalue direction is a trustworthy ridge tangent when
    /// `λ_min / λ_mid <= 0.7` and `λ_mid / λ_max >= 0.00765`.
    pub fn ridge_is_well_conditioned(&self) -> bool {
        if self.mid() <= 0.0 || self.max() <= 0.0 {
            return false;
        }
        self.min() / self.mid() <= RIDGE_MIN_MID_RATIO
            && self.mid() / self.max() >= RIDGE_MID_MAX_RATIO
    }
}

/// Capability to eigen-decompose a symmetric 3×3 matrix.
pub trait SymmetricEigenSolver {
    /// Eigenpairs in ascending order, or `None` if the solver did not converge.
    fn decompose(&self, matrix: &Matrix3<Real>) -> Option<QuadricEigen>;
}

/// nalgebra symmetric eigen solver with explicit convergence control.
#[derive(Debug, Clone, Copy)]
pub struct NalgebraEigenSolver {
    pub epsilon: Real,
    /// Zero means "iterate until convergence".
    pub max_iterations: usize,
}

impl Default for NalgebraEigenSolver {
    fn default() -> Self {
        Self {
            epsilon: Real::EPSILON,
            max_iterations: 1000,
        }
    }
}

impl SymmetricEigenSolver for NalgebraEigenSolver {
    fn decompose(&self, matrix: &Matrix3<Real>) -> Option<QuadricEigen> {
        let eigen = SymmetricEigen::try_new(*matrix, self.epsilon, self.max_iterations)?;
        QuadricEigen::from_unsorted(eigen.eigenvalues, eigen.eigenvectors)
    }
}

/// Area-weighted normal covariance `Σ wᵢ nᵢ nᵢᵀ`.
///
/// Entries with zero (or negative) weight are skipped so tombstoned and
/// collapsed triangles cannot contribute.
pub fn medial_quadric<'a, I>(weighted_normals: I) -> Matrix3<Real>
where
    I: IntoIterator<Item = (&'a Vector3<Real>, Real)>,
{
    let mut quadric = Matrix3::zeros();
    for (normal, weight) in weighted_normals {
        if weight > 0.0 {
            quadric += normal * normal.transpose() * weight;
        }
    }
    quadric
}

/// Orthogonal projector `Σ tᵢ tᵢᵀ` onto the span of an orthonormal basis.
pub fn projection_matrix(basis: &[Vector3<Real>]) -> Matrix3<Real> {
    basis
        .iter()
        .fold(Matrix3::zeros(), |acc, t| acc + t * t.transpose())
}
