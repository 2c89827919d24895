//! SDF conversion seam and the fixed-parameter converter.

use mesh_sdf::{SdfError, SdfGrid, SdfOutput, SdfParams, SdfResult, compute_sdf};
use mesh_types::{IndexedMesh, Vertex};
use tracing::debug;

use crate::config::ConversionConfig;
use crate::error::Result;

/// Dense SDF and watertight repair capability.
///
/// `vertices` are expected in normalized space, roughly `[-1, 1]^3`.
pub trait SdfBackend {
    /// Compute an `R^3` distance grid and, when `return_mesh` is set, the
    /// repaired surface.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError`] when the topology cannot be converted.
    fn compute(
        &self,
        vertices: &[Vertex],
        faces: &[[u32; 3]],
        resolution: usize,
        fix: bool,
        level: f64,
        return_mesh: bool,
    ) -> SdfResult<SdfOutput>;
}

/// [`SdfBackend`] backed by [`mesh_sdf::compute_sdf`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseSdfBackend;

impl SdfBackend for DenseSdfBackend {
    fn compute(
        &self,
        vertices: &[Vertex],
        faces: &[[u32; 3]],
        resolution: usize,
        fix: bool,
        level: f64,
        return_mesh: bool,
    ) -> SdfResult<SdfOutput> {
        let mesh = IndexedMesh::from_parts(vertices.to_vec(), faces.to_vec());
        let params = SdfParams::new(resolution)
            .with_level(level)
            .with_fix(fix)
            .with_return_mesh(return_mesh);
        compute_sdf(&mesh, &params)
    }
}

/// A converted item: distance grid plus repaired mesh, both in normalized
/// space.
#[derive(Debug, Clone)]
pub struct Converted {
    /// Signed distance grid.
    pub grid: SdfGrid,
    /// Watertight surface extracted from the grid.
    pub mesh: IndexedMesh,
}

/// Runs an [`SdfBackend`] with resolution and level fixed for a whole run.
///
/// Repair and mesh extraction are always on. Outputs are checked before they
/// are handed on: exactly `R^3` finite values and a repaired mesh.
#[derive(Debug, Clone)]
pub struct SdfConverter<B = DenseSdfBackend> {
    backend: B,
    resolution: usize,
    level: f64,
}

impl SdfConverter<DenseSdfBackend> {
    /// Converter over [`DenseSdfBackend`] with the config's parameters.
    #[must_use]
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::with_backend(DenseSdfBackend, config)
    }
}

impl<B: SdfBackend> SdfConverter<B> {
    /// Converter over `backend` with explicit parameters.
    #[must_use]
    pub const fn new(backend: B, resolution: usize, level: f64) -> Self {
        Self {
            backend,
            resolution,
            level,
        }
    }

    /// Converter over `backend` with the config's parameters.
    #[must_use]
    pub fn with_backend(backend: B, config: &ConversionConfig) -> Self {
        Self::new(backend, config.resolution, config.effective_level())
    }

    /// Grid resolution used for every item.
    #[must_use]
    pub const fn resolution(&self) -> usize {
        self.resolution
    }

    /// Iso-level used for every item.
    #[must_use]
    pub const fn level(&self) -> f64 {
        self.level
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Convert a normalized mesh.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DatasetError::Conversion`] if the backend fails, the
    /// grid has the wrong shape or non-finite values, or no repaired mesh
    /// came back.
    pub fn convert(&self, mesh: &IndexedMesh) -> Result<Converted> {
        let output = self.backend.compute(
            &mesh.vertices,
            &mesh.faces,
            self.resolution,
            true,
            self.level,
            true,
        )?;

        let expected = self.resolution.pow(3);
        if output.grid.resolution() != self.resolution || output.grid.len() != expected {
            return Err(SdfError::ShapeMismatch {
                expected,
                got: output.grid.len(),
            }
            .into());
        }
        if !output.grid.is_finite() {
            return Err(SdfError::NonFinite("distance grid").into());
        }
        let repaired = output.mesh.ok_or(SdfError::EmptySurface)?;
        debug!(
            resolution = self.resolution,
            faces = repaired.faces.len(),
            "converted mesh"
        );

        Ok(Converted {
            grid: output.grid,
            mesh: repaired,
        })
    }
}
