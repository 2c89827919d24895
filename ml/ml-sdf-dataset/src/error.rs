//! Error types for ml-sdf-dataset crate.

use std::path::PathBuf;

use mesh_io::IoError;
use mesh_sdf::SdfError;
use thiserror::Error;

/// Errors that can occur while building a dataset.
///
/// Everything except [`DatasetError::Configuration`] and an aborting
/// [`DatasetError::KeyCollision`] is recovered per item: the item is marked
/// failed and the batch continues.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Input file unreadable or not parseable as a mesh.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// Offending input file.
        path: PathBuf,
        /// Loader failure.
        #[source]
        source: IoError,
    },

    /// Mesh extent is zero (or undefined) so normalization has no scale.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The SDF capability rejected the mesh.
    #[error("SDF conversion failed: {0}")]
    Conversion(#[from] SdfError),

    /// Distinct inputs sanitize to the same model key.
    #[error("model key `{key}` is shared by {} inputs: {}", paths.len(), join_paths(paths))]
    KeyCollision {
        /// Colliding key.
        key: String,
        /// Source paths in discovery order; the first owns the key.
        paths: Vec<PathBuf>,
    },

    /// Run configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Writing an artifact failed.
    #[error("failed to write {}: {source}", path.display())]
    Persist {
        /// Artifact being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Reading back a persisted artifact failed.
    #[error("malformed artifact {}: {reason}", path.display())]
    Artifact {
        /// Artifact being read.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
}

impl DatasetError {
    /// Creates a load error.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, source: IoError) -> Self {
        Self::Load {
            path: path.into(),
            source,
        }
    }

    /// Creates a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry(reason.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed artifact error.
    #[must_use]
    pub fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error aborts the whole batch rather than one item.
    ///
    /// A key collision is only ever raised under the abort policy; the
    /// warn policy records colliding inputs as item failures instead.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::KeyCollision { .. })
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for ml-sdf-dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_load_names_path() {
        let err = DatasetError::load("raw/broken.obj", IoError::EmptyMesh);
        let msg = err.to_string();
        assert!(msg.contains("raw/broken.obj"));
        assert!(msg.contains("no faces"));
    }

    #[test]
    fn error_key_collision_lists_all_paths() {
        let err = DatasetError::KeyCollision {
            key: "cube_obj".to_string(),
            paths: vec![PathBuf::from("raw/Cube.obj"), PathBuf::from("raw/cube.obj")],
        };
        let msg = err.to_string();
        assert!(msg.contains("cube_obj"));
        assert!(msg.contains("raw/Cube.obj"));
        assert!(msg.contains("raw/cube.obj"));
    }

    #[test]
    fn error_from_sdf_error() {
        let err: DatasetError = SdfError::EmptyMesh.into();
        assert!(matches!(err, DatasetError::Conversion(_)));
    }

    #[test]
    fn configuration_and_collision_are_fatal() {
        assert!(DatasetError::configuration("missing input").is_fatal());
        let collision = DatasetError::KeyCollision {
            key: "cube_obj".to_string(),
            paths: vec![PathBuf::from("raw/Cube.obj"), PathBuf::from("raw/cube.obj")],
        };
        assert!(collision.is_fatal());
        assert!(!DatasetError::degenerate("zero extent").is_fatal());
        assert!(!DatasetError::Conversion(SdfError::EmptySurface).is_fatal());
    }

    #[test]
    fn error_persist() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DatasetError::persist("out/sdf_a.npy", io);
        assert!(err.to_string().contains("sdf_a.npy"));
    }
}
