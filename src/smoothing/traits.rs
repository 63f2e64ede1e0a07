//! Traits for observing smoothing passes.

use crate::mesh::SurfaceMesh;

/// Receives notifications from the smoothing pass driver.
pub trait MeshEventListener {
    /// Called once a smoothing pass has visited every eligible vertex.
    fn smoothing(&mut self, mesh: &SurfaceMesh);
}
