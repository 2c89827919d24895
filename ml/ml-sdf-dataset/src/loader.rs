//! Mesh loading seam.

use std::path::Path;

use mesh_io::IoError;
use mesh_types::IndexedMesh;

use crate::error::{DatasetError, Result};

/// Loads one input file as a single triangle mesh.
///
/// Multi-object files must be flattened into one mesh by the implementor.
pub trait MeshLoader {
    /// Load `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Load`] for unreadable, unsupported or
    /// malformed input.
    fn load(&self, path: &Path) -> Result<IndexedMesh>;
}

/// Loads OBJ and STL files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMeshLoader;

impl MeshLoader for FileMeshLoader {
    fn load(&self, path: &Path) -> Result<IndexedMesh> {
        mesh_io::load_mesh(path).map_err(|e| DatasetError::load(path, e))
    }
}

/// Reject meshes whose faces reference missing vertices.
///
/// # Errors
///
/// Returns [`DatasetError::Load`] naming the first offending face.
pub fn check_face_indices(path: &Path, mesh: &IndexedMesh) -> Result<()> {
    match mesh.first_invalid_face() {
        None => Ok(()),
        Some((face, indices)) => Err(DatasetError::load(
            path,
            IoError::invalid_content(format!(
                "face {face} {indices:?} references a vertex beyond {}",
                mesh.vertices.len()
            )),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn missing_file_is_load_error() {
        let err = FileMeshLoader.load(Path::new("/nonexistent/cube.obj")).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Load {
                source: IoError::FileNotFound { .. },
                ..
            }
        ));
    }

    #[test]
    fn loads_obj_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = FileMeshLoader.load(&path).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn face_index_check() {
        let path = Path::new("x.obj");
        let mut cube = unit_cube();
        assert!(check_face_indices(path, &cube).is_ok());
        cube.faces.push([0, 1, 8]);
        let err = check_face_indices(path, &cube).unwrap_err();
        assert!(err.to_string().contains("face 12"));
    }
}
