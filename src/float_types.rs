// Re-export parry for the appropriate float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized contact tolerance used by the continuous collision tests.
/// Defaults depend on precision (`f32` vs `f64`), but can be overridden:
///  1) **Build-time**: set env var `SURFSMOOTH_TOLERANCE` (e.g. `SURFSMOOTH_TOLERANCE=1e-8 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before running a smoothing pass
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    #[cfg(feature = "f32")]
    {
        1e-4
    }
    #[cfg(feature = "f64")]
    {
        1e-6
    }
}

/// Returns the current contact tolerance.
/// If not set yet, it tries `SURFSMOOTH_TOLERANCE` (parsed as the active `Real`) and
/// falls back to a sensible default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("SURFSMOOTH_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the contact tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `surfsmooth::float_types::set_tolerance(1e-8);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// Quadric analysis
// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// An eigen-direction belongs to the null space when its eigenvalue is below
/// this fraction of the largest eigenvalue.
pub const EIGENVALUE_RANK_RATIO: Real = 0.03;

/// Ridge direction from the quadric is trusted only if `eig_min / eig_mid` is at most this.
pub const RIDGE_MIN_MID_RATIO: Real = 0.7;

/// Ridge direction from the quadric is trusted only if `eig_mid / eig_max` is at least this.
pub const RIDGE_MID_MAX_RATIO: Real = 0.00765;

/// Squared cross-product magnitude under which a triangle counts as "super small".
pub const TINY_TRIANGLE_AREA_SQUARED: Real = 1e-14;
