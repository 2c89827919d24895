//! Input discovery and the sequential batch driver.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{CollisionPolicy, ConversionConfig};
use crate::error::{DatasetError, Result};
use crate::invoker::{DenseSdfBackend, SdfBackend, SdfConverter};
use crate::job::{ConversionJob, JobOutcome};
use crate::loader::{FileMeshLoader, MeshLoader};
use crate::report::BatchReport;
use crate::sanitize::{KeyCollision, KeyRegistry, sanitize_path};

/// List the files in `input_dir` with an accepted extension.
///
/// Extensions match case-insensitively and are given in priority order:
/// files of the first extension come first, each group sorted by path.
/// Subdirectories are not searched.
///
/// # Errors
///
/// Returns [`DatasetError::Configuration`] if the directory cannot be read.
pub fn discover_inputs(input_dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let unreadable = |e: std::io::Error| {
        DatasetError::configuration(format!("cannot read {}: {e}", input_dir.display()))
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() {
            files.push(path);
        }
    }

    let extension_of = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    };

    let mut inputs = Vec::with_capacity(files.len());
    for ext in extensions {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        let mut group: Vec<PathBuf> = files
            .iter()
            .filter(|p| extension_of(p).as_deref() == Some(ext.as_str()))
            .filter(|p| !inputs.contains(*p))
            .cloned()
            .collect();
        group.sort();
        inputs.extend(group);
    }
    Ok(inputs)
}

/// What a batch will do, decided before any conversion.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    /// Inputs to attempt, in order, after the limit is applied.
    pub inputs: Vec<PathBuf>,
    /// Number of inputs found before the limit.
    pub discovered: usize,
    /// Key collisions across every discovered input.
    pub collisions: Vec<KeyCollision>,
    registry: KeyRegistry,
}

impl BatchPlan {
    /// Whether `path` owns its model key (no earlier input shares it).
    #[must_use]
    pub fn owns_key(&self, path: &Path) -> bool {
        self.registry.is_owner(path)
    }
}

/// Runs [`ConversionJob`]s over an input directory, one at a time.
///
/// # Example
///
/// ```no_run
/// use ml_sdf_dataset::{BatchDriver, ConversionConfig};
///
/// let config = ConversionConfig::new("skulls-raw", "skulls-sdf").with_limit(3);
/// let report = BatchDriver::new(config).run()?;
/// println!("{} processed, {} skipped, {} failed", report.processed, report.skipped, report.failed);
/// # Ok::<(), ml_sdf_dataset::DatasetError>(())
/// ```
#[derive(Debug)]
pub struct BatchDriver<L = FileMeshLoader, B = DenseSdfBackend> {
    config: ConversionConfig,
    loader: L,
    converter: SdfConverter<B>,
}

impl BatchDriver {
    /// Driver that loads files from disk and uses the dense SDF backend.
    #[must_use]
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_parts(config, FileMeshLoader, DenseSdfBackend)
    }
}

impl<L: MeshLoader, B: SdfBackend> BatchDriver<L, B> {
    /// Driver with a custom loader and SDF backend.
    #[must_use]
    pub fn with_parts(config: ConversionConfig, loader: L, backend: B) -> Self {
        let converter = SdfConverter::with_backend(backend, &config);
        Self {
            config,
            loader,
            converter,
        }
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// The fixed-parameter converter.
    #[must_use]
    pub const fn converter(&self) -> &SdfConverter<B> {
        &self.converter
    }

    /// Validate the configuration and create the dataset directory if
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Configuration`] for an unusable setup.
    pub fn prepare(&self) -> Result<()> {
        self.config.validate()?;
        if !self.config.dataset_dir.is_dir() {
            std::fs::create_dir_all(&self.config.dataset_dir).map_err(|e| {
                DatasetError::configuration(format!(
                    "cannot create {}: {e}",
                    self.config.dataset_dir.display()
                ))
            })?;
            info!(dir = %self.config.dataset_dir.display(), "created dataset directory");
        }
        Ok(())
    }

    /// Discover inputs, register their keys and apply the limit.
    ///
    /// Collisions are found over every discovered input, not only those
    /// within the limit.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Configuration`] if the input directory cannot
    /// be read.
    pub fn plan(&self) -> Result<BatchPlan> {
        let mut inputs = discover_inputs(
            &self.config.input_dir,
            &self.config.normalized_extensions(),
        )?;
        let discovered = inputs.len();
        let registry = KeyRegistry::from_paths(&inputs);
        let collisions = registry.collisions();
        if let Some(limit) = self.config.limit {
            inputs.truncate(limit);
        }
        Ok(BatchPlan {
            inputs,
            discovered,
            collisions,
            registry,
        })
    }

    /// Convert every planned input, in order.
    ///
    /// Per-item failures are logged and counted; they never stop the batch.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::Configuration`] before any item is processed
    /// - [`DatasetError::KeyCollision`] under [`CollisionPolicy::Abort`]
    pub fn run(&self) -> Result<BatchReport> {
        self.prepare()?;
        let plan = self.plan()?;

        for collision in &plan.collisions {
            let paths: Vec<String> = collision
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            warn!(
                "model key `{}` is shared by {}; only the first is converted",
                collision.key,
                paths.join(", ")
            );
        }
        if let (CollisionPolicy::Abort, Some(first)) =
            (self.config.collision_policy, plan.collisions.first())
        {
            return Err(DatasetError::KeyCollision {
                key: first.key.to_string(),
                paths: first.paths.clone(),
            });
        }

        let total = plan.inputs.len();
        info!(
            discovered = plan.discovered,
            selected = total,
            resolution = self.converter.resolution(),
            level = self.converter.level(),
            "converting {total} meshes into {}",
            self.config.dataset_dir.display()
        );

        let mut report = BatchReport {
            collisions: plan.collisions.clone(),
            ..BatchReport::default()
        };

        for (n, path) in plan.inputs.iter().enumerate() {
            info!("[{}/{}] {}", n + 1, total, path.display());

            if !plan.owns_key(path) {
                let key = sanitize_path(path);
                let owner = plan
                    .registry
                    .owner(&key)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let cause = format!("model key `{key}` already belongs to {owner}");
                warn!("{}: {cause}", path.display());
                report.record_failure(path.clone(), cause);
                continue;
            }

            let job = ConversionJob::new(
                path.clone(),
                &self.config.dataset_dir,
                self.config.mesh_scale,
            );
            let outcome = job.run(&self.loader, &self.converter);
            if let JobOutcome::Failed { path, stage, error } = &outcome {
                warn!("{}: {error} (after {stage})", path.display());
            }
            report.record(&outcome);
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "batch complete"
        );
        Ok(report)
    }
}
