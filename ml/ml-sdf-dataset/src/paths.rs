//! Artifact locations inside a dataset directory.

use std::path::{Path, PathBuf};

use crate::sanitize::ModelKey;

/// Prefix of the metadata (bounding box) archive.
pub const METADATA_PREFIX: &str = "box_";
/// Prefix of the distance grid array.
pub const GRID_PREFIX: &str = "sdf_";
/// Prefix of the repaired mesh.
pub const MESH_PREFIX: &str = "mesh_";

/// Extension of the metadata archive.
pub const METADATA_EXTENSION: &str = "npz";
/// Extension of the distance grid array.
pub const GRID_EXTENSION: &str = "npy";
/// Extension of the repaired mesh.
pub const MESH_EXTENSION: &str = "obj";

/// The three artifact paths of one model key.
///
/// The metadata file doubles as the completion marker: it is written last,
/// so its presence means the grid and mesh are already in place.
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::{sanitize, ArtifactPaths};
/// use std::path::Path;
///
/// let paths = ArtifactPaths::resolve("skulls-sdf", &sanitize("Skull 01.stl"));
/// assert_eq!(paths.metadata, Path::new("skulls-sdf/box_skull_01_stl.npz"));
/// assert_eq!(paths.grid, Path::new("skulls-sdf/sdf_skull_01_stl.npy"));
/// assert_eq!(paths.mesh, Path::new("skulls-sdf/mesh_skull_01_stl.obj"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Bounding box record (`box_<key>.npz`).
    pub metadata: PathBuf,
    /// Distance grid (`sdf_<key>.npy`).
    pub grid: PathBuf,
    /// Repaired mesh (`mesh_<key>.obj`).
    pub mesh: PathBuf,
}

impl ArtifactPaths {
    /// Derive the paths for `key` under `dataset_dir`. Performs no I/O.
    #[must_use]
    pub fn resolve(dataset_dir: impl AsRef<Path>, key: &ModelKey) -> Self {
        let dir = dataset_dir.as_ref();
        let file = |prefix: &str, ext: &str| dir.join(format!("{prefix}{key}.{ext}"));
        Self {
            metadata: file(METADATA_PREFIX, METADATA_EXTENSION),
            grid: file(GRID_PREFIX, GRID_EXTENSION),
            mesh: file(MESH_PREFIX, MESH_EXTENSION),
        }
    }

    /// Whether the completion marker exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.metadata.is_file()
    }

    /// All three paths, metadata last.
    #[must_use]
    pub fn in_write_order(&self) -> [&Path; 3] {
        [&self.grid, &self.mesh, &self.metadata]
    }
}
