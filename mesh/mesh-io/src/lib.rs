//! Mesh file I/O for the SDF dataset pipeline.
//!
//! This crate provides loading of triangle meshes from the two input formats
//! a raw mesh directory carries, and export of repaired meshes:
//!
//! - **OBJ** (Wavefront) - ASCII, load and save
//! - **STL** (Stereolithography) - Binary and ASCII, load only
//!
//! Multi-object files are flattened into a single [`IndexedMesh`].
//!
//! # Format Detection
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_obj};
//!
//! // Format detected from .stl extension
//! let mesh = load_mesh("model.stl").unwrap();
//!
//! save_obj(&mesh, "model.obj").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod obj;
mod stl;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, parse_obj, save_obj, write_obj};
pub use stl::{load_stl, parse_stl};

use std::path::Path;

use mesh_types::IndexedMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL (Stereolithography) format.
    /// Supports binary and ASCII variants.
    Stl,
    /// OBJ (Wavefront) format.
    /// ASCII only, vertices and faces.
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    ///
    /// Returns `None` if the extension is missing or not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }
}

/// Load a mesh from a file, detecting format from extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The file cannot be read
/// - The file content is invalid for the detected format
/// - The file contains no faces
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    let mesh = match format {
        MeshFormat::Stl => load_stl(path),
        MeshFormat::Obj => load_obj(path),
    }?;

    if mesh.faces.is_empty() {
        return Err(IoError::EmptyMesh);
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_path_stl() {
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model.STL"), Some(MeshFormat::Stl));
        assert_eq!(
            MeshFormat::from_path("/path/to/model.stl"),
            Some(MeshFormat::Stl)
        );
    }

    #[test]
    fn format_from_path_obj() {
        assert_eq!(MeshFormat::from_path("model.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("My Model (v2).OBJ"), Some(MeshFormat::Obj));
    }

    #[test]
    fn format_from_path_unknown() {
        assert_eq!(MeshFormat::from_path("model.ply"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn format_extension() {
        assert_eq!(MeshFormat::Stl.extension(), "stl");
        assert_eq!(MeshFormat::Obj.extension(), "obj");
    }

    #[test]
    fn load_unknown_extension() {
        let result = load_mesh("model.xyz");
        assert!(matches!(result, Err(IoError::UnknownFormat { ref extension }) if extension == "xyz"));
    }
}
