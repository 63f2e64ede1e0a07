//! Smoothing errors

/// Result alias used across the crate.
pub type SmoothingResult<T> = Result<T, SmoothingError>;

/// All the possible failures we might encounter while building a mesh or smoothing a vertex.
///
/// Only mesh construction surfaces these to callers. Per-vertex failures are
/// absorbed by the smoothing pass, which zeroes the displacement and logs them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmoothingError {
    /// (InvalidTriangle) A triangle references a vertex that does not exist
    #[error("(InvalidTriangle) Triangle {triangle} references vertex {vertex} (vertex count = {vertex_count})")]
    InvalidTriangle {
        triangle: usize,
        vertex: usize,
        vertex_count: usize,
    },
    /// (LabelCountMismatch) Region labels were supplied for the wrong number of triangles
    #[error("(LabelCountMismatch) Got {labels} region label pairs for {triangles} triangles")]
    LabelCountMismatch { labels: usize, triangles: usize },
    /// (VertexOutOfRange) A per-vertex update addressed a vertex that does not exist
    #[error("(VertexOutOfRange) Vertex {vertex} is out of range (vertex count = {vertex_count})")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },
    /// (EigenDecompositionFailed) The medial quadric eigen solver did not converge
    #[error("(EigenDecompositionFailed) Quadric eigen decomposition failed at vertex {vertex} over triangles {triangles:?}")]
    EigenDecompositionFailed { vertex: usize, triangles: Vec<usize> },
    /// (RidgeDirectionUnavailable) No usable ridge tangent could be built
    #[error("(RidgeDirectionUnavailable) Vertex {vertex} with {feature_edges} feature edges has no ridge direction")]
    RidgeDirectionUnavailable { vertex: usize, feature_edges: usize },
    /// (DisplacementCountMismatch) A displacement field does not cover every vertex
    #[error("(DisplacementCountMismatch) Got {displacements} displacements for {vertices} vertices")]
    DisplacementCountMismatch { displacements: usize, vertices: usize },
}
