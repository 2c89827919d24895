//! Conversion of a single input file.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DatasetError;
use crate::invoker::{SdfBackend, SdfConverter};
use crate::loader::{MeshLoader, check_face_indices};
use crate::normalize::normalize;
use crate::paths::ArtifactPaths;
use crate::persist::persist_artifacts;
use crate::sanitize::{ModelKey, sanitize_path};

/// Stages of one conversion.
///
/// `Skipped` and `Failed` are terminal; `Persisted` is the success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Not started.
    Pending,
    /// Mesh read from disk.
    Loaded,
    /// Face indices verified.
    Checked,
    /// Centered and scaled into the grid cube.
    Normalized,
    /// Distance grid and repaired mesh computed.
    Converted,
    /// All three artifacts written.
    Persisted,
    /// Artifacts already present from an earlier run.
    Skipped,
    /// Unrecoverable for this item.
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Loaded => "loaded",
            Self::Checked => "checked",
            Self::Normalized => "normalized",
            Self::Converted => "converted",
            Self::Persisted => "persisted",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// Converted and written.
    Persisted {
        /// Model key of the item.
        key: ModelKey,
    },
    /// Completion marker already present; nothing was done.
    Skipped {
        /// Model key of the item.
        key: ModelKey,
    },
    /// Conversion failed; nothing was marked complete.
    Failed {
        /// Input file.
        path: PathBuf,
        /// Last state reached before the failure.
        stage: JobState,
        /// Cause.
        error: DatasetError,
    },
}

impl JobOutcome {
    /// Terminal state of the job.
    #[must_use]
    pub const fn state(&self) -> JobState {
        match self {
            Self::Persisted { .. } => JobState::Persisted,
            Self::Skipped { .. } => JobState::Skipped,
            Self::Failed { .. } => JobState::Failed,
        }
    }
}

/// One input file and where its artifacts go.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    path: PathBuf,
    key: ModelKey,
    paths: ArtifactPaths,
    mesh_scale: f64,
}

impl ConversionJob {
    /// Plan the conversion of `path` into `dataset_dir`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, dataset_dir: &Path, mesh_scale: f64) -> Self {
        let path = path.into();
        let key = sanitize_path(&path);
        let paths = ArtifactPaths::resolve(dataset_dir, &key);
        Self {
            path,
            key,
            paths,
            mesh_scale,
        }
    }

    /// Input file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Model key.
    #[must_use]
    pub const fn key(&self) -> &ModelKey {
        &self.key
    }

    /// Output locations.
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Run the job to a terminal state.
    ///
    /// Never panics on bad input: every failure is returned as
    /// [`JobOutcome::Failed`] with the stage it happened after. Writes
    /// happen only on the way to [`JobOutcome::Persisted`].
    pub fn run<L, B>(&self, loader: &L, converter: &SdfConverter<B>) -> JobOutcome
    where
        L: MeshLoader + ?Sized,
        B: SdfBackend,
    {
        if self.paths.is_complete() {
            debug!(key = %self.key, "artifacts present, skipping");
            return JobOutcome::Skipped {
                key: self.key.clone(),
            };
        }

        let mut stage = JobState::Pending;
        match self.convert(loader, converter, &mut stage) {
            Ok(()) => JobOutcome::Persisted {
                key: self.key.clone(),
            },
            Err(error) => JobOutcome::Failed {
                path: self.path.clone(),
                stage,
                error,
            },
        }
    }

    fn convert<L, B>(
        &self,
        loader: &L,
        converter: &SdfConverter<B>,
        stage: &mut JobState,
    ) -> Result<(), DatasetError>
    where
        L: MeshLoader + ?Sized,
        B: SdfBackend,
    {
        let mesh = loader.load(&self.path)?;
        *stage = JobState::Loaded;

        check_face_indices(&self.path, &mesh)?;
        *stage = JobState::Checked;

        let (normalized, bbox) = normalize(&mesh, self.mesh_scale)?;
        drop(mesh);
        *stage = JobState::Normalized;

        let converted = converter.convert(&normalized)?;
        *stage = JobState::Converted;

        persist_artifacts(&self.paths, &bbox, &converted.grid, &converted.mesh)?;
        *stage = JobState::Persisted;

        debug!(key = %self.key, mul = bbox.mul, "converted");
        Ok(())
    }
}
