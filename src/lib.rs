//! Feature-preserving **vertex relocation** ("smoothing") for dynamic
//! surface-tracking triangle meshes.
//!
//! A smoothing pass visits the vertices of a [`SurfaceMesh`] whose incident
//! triangles have poor angles and moves each one towards the area-weighted
//! centroid of its neighbourhood, restricted by a medial-quadric analysis so
//! that smooth regions stay on their tangent plane, ridges slide along their
//! crease and corners stay put. Every move is checked against the rest of the
//! mesh with a continuous collision test before it is committed.
//!
//! ```no_run
//! use nalgebra::Point3;
//! use surfsmooth::{MeshSmoother, SmoothingParams, SurfaceMesh};
//!
//! # fn main() -> Result<(), surfsmooth::errors::SmoothingError> {
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let triangles = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
//! let mut mesh = SurfaceMesh::new(positions, triangles)?;
//!
//! let mut smoother = MeshSmoother::new(SmoothingParams::default());
//! let report = smoother.null_space_smoothing_pass(&mut mesh, 0.01);
//! assert!(report.completed());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to build the per-pass triangle cache

#![forbid(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod collision;
pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod params;
pub mod quadric;
pub mod smoothing;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::{SmoothingError, SmoothingResult};
pub use mesh::SurfaceMesh;
pub use params::{PinnedAxisPolicy, SmoothingParams};
pub use smoothing::{MeshEventListener, MeshSmoother, PassStatus, SmoothingReport};
