//! Error types for SDF operations.

use thiserror::Error;

/// Result type for SDF operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors that can occur during SDF computation.
#[derive(Debug, Error)]
pub enum SdfError {
    /// Mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Every face has (near) zero area, so there is no surface to measure.
    #[error("mesh has no non-degenerate faces ({faces} degenerate)")]
    DegenerateMesh {
        /// Number of faces that were discarded.
        faces: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but mesh has {vertex_count} vertices")]
    InvalidIndex {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Grid parameters are invalid.
    #[error("invalid grid parameters: {0}")]
    InvalidParams(String),

    /// Input coordinates or output distances are not finite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    /// The repaired surface came out empty (nothing crosses the iso-level).
    #[error("extracted surface is empty")]
    EmptySurface,

    /// Grid value buffer does not match the requested shape.
    #[error("grid holds {got} values, expected {expected}")]
    ShapeMismatch {
        /// `resolution^3`.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_message() {
        let err = SdfError::InvalidIndex {
            face: 3,
            index: 42,
            vertex_count: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("face 3"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn shape_mismatch_message() {
        let err = SdfError::ShapeMismatch {
            expected: 8,
            got: 7,
        };
        assert!(err.to_string().contains("expected 8"));
    }
}
