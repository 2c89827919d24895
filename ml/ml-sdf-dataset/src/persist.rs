//! Artifact encoding and crash-safe writes.
//!
//! Each artifact goes to a sibling temporary file that is renamed into
//! place once complete, so a reader never sees a half-written file under its
//! final name. The metadata archive is renamed last: its presence marks the
//! whole triple as complete.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use mesh_sdf::SdfGrid;
use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::normalize::BoundingBox;
use crate::npy::{self, NpyArray};
use crate::paths::ArtifactPaths;

/// Suffix of in-progress artifact files.
pub const TEMP_SUFFIX: &str = ".part";

/// Sibling path an artifact is staged under before the rename.
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// `.npz` payload holding `bbmin`, `bbmax` and `mul` as float64 arrays.
///
/// # Errors
///
/// Returns [`DatasetError::Persist`] (against `path`) if the archive cannot
/// be assembled.
pub fn encode_metadata(bbox: &BoundingBox, path: &Path) -> Result<Vec<u8>> {
    npy::encode_npz(&[
        ("bbmax", npy::encode(&[3], bbox.bbmax.coords.as_slice())),
        ("bbmin", npy::encode(&[3], bbox.bbmin.coords.as_slice())),
        ("mul", npy::encode(&[], &[bbox.mul])),
    ])
    .map_err(|e| DatasetError::persist(path, std::io::Error::other(e)))
}

/// Read a metadata archive written by [`persist_artifacts`].
///
/// # Errors
///
/// Returns [`DatasetError::Persist`] if the file cannot be read and
/// [`DatasetError::Artifact`] if it is not a valid metadata archive.
pub fn read_metadata(path: impl AsRef<Path>) -> Result<BoundingBox> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| DatasetError::persist(path, e))?;

    let point = |name: &str| -> Result<Point3<f64>> {
        let NpyArray { shape, data } = npy::read_npz_entry::<f64>(&bytes, name)
            .map_err(|e| DatasetError::artifact(path, format!("{name}: {e}")))?;
        match (shape.as_slice(), data.as_slice()) {
            ([3], &[x, y, z]) => Ok(Point3::new(x, y, z)),
            _ => Err(DatasetError::artifact(
                path,
                format!("{name} has shape {shape:?}, expected (3,)"),
            )),
        }
    };
    let bbmin = point("bbmin")?;
    let bbmax = point("bbmax")?;

    let mul = npy::read_npz_entry::<f64>(&bytes, "mul")
        .map_err(|e| DatasetError::artifact(path, format!("mul: {e}")))?;
    let mul = match mul.data.as_slice() {
        &[m] if m.is_finite() && m > 0.0 => m,
        other => {
            return Err(DatasetError::artifact(
                path,
                format!("mul must be one positive value, got {other:?}"),
            ));
        }
    };

    Ok(BoundingBox { bbmin, bbmax, mul })
}

/// Write `bytes` to `path` through a staging file.
///
/// # Errors
///
/// Returns [`DatasetError::Persist`] on any I/O failure; the staging file
/// is removed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    let result = write_synced(&staging, bytes).and_then(|()| std::fs::rename(&staging, path));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&staging);
        return Err(DatasetError::persist(path, e));
    }
    Ok(())
}

/// Write and flush `bytes` to disk before the staging file is renamed.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Encode and write one item's three artifacts, metadata last.
///
/// All payloads are encoded before the first write, so an encoding failure
/// leaves nothing on disk.
///
/// # Errors
///
/// Returns [`DatasetError::Persist`] if encoding or any write fails. A
/// failure before the metadata rename leaves the item incomplete, and it is
/// redone on the next run.
pub fn persist_artifacts(
    paths: &ArtifactPaths,
    bbox: &BoundingBox,
    grid: &SdfGrid,
    mesh: &IndexedMesh,
) -> Result<()> {
    let grid_bytes = npy::encode(&grid.shape(), grid.values());

    let mut mesh_bytes = Vec::new();
    mesh_io::write_obj(mesh, &mut mesh_bytes).map_err(|e| {
        DatasetError::persist(&paths.mesh, std::io::Error::other(e.to_string()))
    })?;

    let metadata_bytes = encode_metadata(bbox, &paths.metadata)?;

    write_atomic(&paths.grid, &grid_bytes)?;
    write_atomic(&paths.mesh, &mesh_bytes)?;
    write_atomic(&paths.metadata, &metadata_bytes)?;

    debug!(
        metadata = %paths.metadata.display(),
        grid_bytes = grid_bytes.len(),
        mesh_bytes = mesh_bytes.len(),
        "persisted artifacts"
    );
    Ok(())
}
