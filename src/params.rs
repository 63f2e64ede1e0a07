//! Global smoothing parameters.

use crate::float_types::{EIGENVALUE_RANK_RATIO, PI, Real};

/// What to write into the displacement of a vertex whose axis is pinned ("solid").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinnedAxisPolicy {
    /// Axis `i` is overwritten with the constant `i` (0, 1, 2).
    ///
    /// This reproduces the established behaviour of the smoother and is kept
    /// until the intended semantics are confirmed against reference output.
    #[default]
    IndexConstant,
    /// Pinned axes get a zero displacement component.
    Zero,
}

impl PinnedAxisPolicy {
    /// Value written into component `axis` of a displacement when that axis is pinned.
    pub const fn pinned_value(self, axis: usize) -> Real {
        match self {
            PinnedAxisPolicy::IndexConstant => axis as Real,
            PinnedAxisPolicy::Zero => 0.0,
        }
    }
}

/// Parameters shared by every stage of a smoothing pass.
#[derive(Debug, Clone)]
pub struct SmoothingParams {
    /// Displacements longer than twice this are rejected.
    /// `None` measures the longest live edge at the start of each pass.
    pub max_edge_length: Option<Real>,

    /// Aggressive mode: a triangle is bad if any angle cosine is below this...
    pub min_angle_cosine: Real,
    /// ...or above this.
    pub max_angle_cosine: Real,

    /// A vertex is worth smoothing if an incident angle cosine is below this...
    pub trigger_min_angle_cosine: Real,
    /// ...or above this.
    pub trigger_max_angle_cosine: Real,

    /// Angle between adjacent normals (radians) above which an edge is a feature.
    pub feature_edge_angle_threshold: Real,

    /// An edge whose normal angle is within this of π is treated as a fold (radians).
    pub sharp_fold_regularization_threshold: Real,

    /// Run the collision safety gate before committing a move.
    pub collision_safety: bool,

    /// Use naive Laplacian smoothing on triangles with bad angles only.
    pub aggressive_mode: bool,

    /// Moves that bring any candidate pair closer than this are rejected.
    pub improve_collision_epsilon: Real,

    /// Null-space eigenvalue ratio.
    pub rank_ratio: Real,

    /// Displacement written into pinned ("solid") axes.
    pub pinned_axis_policy: PinnedAxisPolicy,

    /// Emit per-triangle and per-vertex diagnostics.
    pub verbose: bool,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            max_edge_length: None,
            min_angle_cosine: (178.0 as Real).to_radians().cos(),
            max_angle_cosine: (2.0 as Real).to_radians().cos(),
            trigger_min_angle_cosine: (160.0 as Real).to_radians().cos(),
            trigger_max_angle_cosine: (20.0 as Real).to_radians().cos(),
            feature_edge_angle_threshold: PI / 6.0,
            sharp_fold_regularization_threshold: (10.0 as Real).to_radians(),
            collision_safety: true,
            aggressive_mode: false,
            improve_collision_epsilon: 2e-6,
            rank_ratio: EIGENVALUE_RANK_RATIO,
            pinned_axis_policy: PinnedAxisPolicy::default(),
            verbose: false,
        }
    }
}

impl SmoothingParams {
    /// Same as [`SmoothingParams::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed edge-length bound instead of the per-pass longest edge.
    pub const fn with_max_edge_length(mut self, max_edge_length: Real) -> Self {
        self.max_edge_length = Some(max_edge_length);
        self
    }

    /// Aggressive-mode triangle trigger, given as minimum and maximum angles in degrees.
    pub fn with_angle_bounds_deg(mut self, min_angle: Real, max_angle: Real) -> Self {
        self.min_angle_cosine = max_angle.to_radians().cos();
        self.max_angle_cosine = min_angle.to_radians().cos();
        self
    }

    /// Per-vertex "worth smoothing" trigger, given as minimum and maximum angles in degrees.
    pub fn with_trigger_angles_deg(mut self, min_angle: Real, max_angle: Real) -> Self {
        self.trigger_min_angle_cosine = max_angle.to_radians().cos();
        self.trigger_max_angle_cosine = min_angle.to_radians().cos();
        self
    }

    /// Normal angle in radians above which an edge is a feature.
    pub const fn with_feature_edge_angle_threshold(mut self, radians: Real) -> Self {
        self.feature_edge_angle_threshold = radians;
        self
    }

    /// Distance from π in radians below which an edge counts as folded.
    pub const fn with_sharp_fold_regularization_threshold(mut self, radians: Real) -> Self {
        self.sharp_fold_regularization_threshold = radians;
        self
    }

    /// Turn the collision safety gate on or off.
    pub const fn with_collision_safety(mut self, enabled: bool) -> Self {
        self.collision_safety = enabled;
        self
    }

    /// Switch between the standard sweep and bad-triangle naive smoothing.
    pub const fn with_aggressive_mode(mut self, enabled: bool) -> Self {
        self.aggressive_mode = enabled;
        self
    }

    /// Minimum separation kept between candidate pairs after a move.
    pub const fn with_improve_collision_epsilon(mut self, epsilon: Real) -> Self {
        self.improve_collision_epsilon = epsilon;
        self
    }

    /// Eigenvalue ratio below which a quadric direction is in the null space.
    pub const fn with_rank_ratio(mut self, ratio: Real) -> Self {
        self.rank_ratio = ratio;
        self
    }

    /// What pinned axes receive; see [`PinnedAxisPolicy`].
    pub const fn with_pinned_axis_policy(mut self, policy: PinnedAxisPolicy) -> Self {
        self.pinned_axis_policy = policy;
        self
    }

    /// Emit per-triangle and per-vertex debug events.
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_bounds_map_to_cosines() {
        let params = SmoothingParams::new().with_angle_bounds_deg(20.0, 160.0);
        assert!((params.max_angle_cosine - (20.0 as Real).to_radians().cos()).abs() < 1e-6);
        assert!((params.min_angle_cosine - (160.0 as Real).to_radians().cos()).abs() < 1e-6);
        assert!(params.min_angle_cosine < params.max_angle_cosine);
    }

    #[test]
    fn builders_set_their_fields() {
        let params = SmoothingParams::new()
            .with_max_edge_length(0.5)
            .with_feature_edge_angle_threshold(0.25)
            .with_sharp_fold_regularization_threshold(0.1)
            .with_collision_safety(false)
            .with_aggressive_mode(true)
            .with_improve_collision_epsilon(1e-4)
            .with_rank_ratio(0.01)
            .with_pinned_axis_policy(PinnedAxisPolicy::Zero)
            .with_verbose(true);

        assert_eq!(params.max_edge_length, Some(0.5));
        assert_eq!(params.feature_edge_angle_threshold, 0.25);
        assert_eq!(params.sharp_fold_regularization_threshold, 0.1);
        assert!(!params.collision_safety);
        assert!(params.aggressive_mode);
        assert_eq!(params.improve_collision_epsilon, 1e-4);
        assert_eq!(params.rank_ratio, 0.01);
        assert_eq!(params.pinned_axis_policy, PinnedAxisPolicy::Zero);
        assert!(params.verbose);
    }

    #[test]
    fn pinned_policy_values() {
        assert_eq!(PinnedAxisPolicy::IndexConstant.pinned_value(0), 0.0);
        assert_eq!(PinnedAxisPolicy::IndexConstant.pinned_value(1), 1.0);
        assert_eq!(PinnedAxisPolicy::IndexConstant.pinned_value(2), 2.0);
        assert_eq!(PinnedAxisPolicy::Zero.pinned_value(2), 0.0);
    }
}
