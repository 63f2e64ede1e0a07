//! Null-space vertex smoothing.

pub mod cache;
pub mod feature;
pub mod pass;
pub mod safety;
pub mod strategy;
pub mod timestep;
pub mod traits;

// Re-export core types
pub use cache::TriangleCache;
pub use feature::VertexClass;
pub use pass::{MeshSmoother, PassStatus, SmoothingReport, VertexOutcome};
pub use strategy::{DisplacementStrategy, LocalGeometry, SkipReason, SmoothingDecision};
pub use timestep::max_inversion_free_step;
pub use traits::MeshEventListener;
