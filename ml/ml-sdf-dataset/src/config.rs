//! Run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// What to do when distinct inputs sanitize to the same model key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log both paths and fail every input after the first for that key.
    #[default]
    Warn,
    /// Abort the batch before any conversion.
    Abort,
}

/// Immutable settings for one dataset generation run.
///
/// Every item converted under one configuration shares the same grid
/// resolution and iso-level, so the resulting artifacts are comparable.
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::ConversionConfig;
///
/// let config = ConversionConfig::new("skulls-raw", "skulls-sdf")
///     .with_resolution(64)
///     .with_limit(3);
///
/// assert_eq!(config.extensions, vec!["obj", "stl"]);
/// assert!((config.effective_level() - 2.0 / 64.0).abs() < 1e-12);
/// assert_eq!(config.limit, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Directory holding the raw meshes (not searched recursively).
    pub input_dir: PathBuf,

    /// Directory receiving the artifact triples.
    pub dataset_dir: PathBuf,

    /// Accepted extensions, in priority order.
    pub extensions: Vec<String>,

    /// Grid edge length.
    pub resolution: usize,

    /// Iso-level; `None` means one cell, `2 / resolution`.
    pub level: Option<f64>,

    /// Half-extent the longest mesh axis is scaled to before conversion.
    pub mesh_scale: f64,

    /// Nominal half-extent of dataset shapes. Validated only; conversion
    /// neither applies nor persists it.
    pub shape_scale: f64,

    /// Convert at most this many discovered inputs.
    pub limit: Option<usize>,

    /// Handling of model key collisions.
    pub collision_policy: CollisionPolicy,

    /// Create the dataset directory if it is missing.
    pub create_dataset_dir: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            dataset_dir: PathBuf::new(),
            extensions: vec!["obj".to_string(), "stl".to_string()],
            resolution: 128,
            level: None,
            mesh_scale: 0.8,
            shape_scale: 0.5,
            limit: None,
            collision_policy: CollisionPolicy::Warn,
            create_dataset_dir: true,
        }
    }
}

impl ConversionConfig {
    /// Creates a config with default parameters for the given directories.
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>, dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            dataset_dir: dataset_dir.into(),
            ..Self::default()
        }
    }

    /// Reads a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Configuration`] if the file cannot be read or
    /// parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DatasetError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
            .map_err(|e| DatasetError::configuration(format!("{}: {e}", path.display())))
    }

    /// Parses a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Configuration`] on malformed JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DatasetError::configuration(format!("invalid config JSON: {e}")))
    }

    /// Sets the accepted extensions.
    #[must_use]
    pub fn with_extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the grid resolution.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets an explicit iso-level.
    #[must_use]
    pub const fn with_level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    /// Sets the normalization half-extent.
    #[must_use]
    pub const fn with_mesh_scale(mut self, mesh_scale: f64) -> Self {
        self.mesh_scale = mesh_scale;
        self
    }

    /// Limits the number of converted inputs.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the collision policy.
    #[must_use]
    pub const fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Sets whether a missing dataset directory is created.
    #[must_use]
    pub const fn with_create_dataset_dir(mut self, create: bool) -> Self {
        self.create_dataset_dir = create;
        self
    }

    /// Iso-level in effect: the explicit level or `2 / resolution`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn effective_level(&self) -> f64 {
        self.level
            .unwrap_or_else(|| 2.0 / self.resolution.max(1) as f64)
    }

    /// Checks parameters and directories without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Configuration`] if:
    /// - the input directory does not exist or is not a directory
    /// - the dataset directory exists but is not a writable directory, or is
    ///   missing while creation is disabled
    /// - the resolution is below 2
    /// - the level is negative or not finite
    /// - `mesh_scale` is not in `(0, 1]` or `shape_scale` is not positive
    /// - the extension list is empty or contains an empty entry
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(DatasetError::configuration(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }

        match std::fs::metadata(&self.dataset_dir) {
            Ok(meta) if !meta.is_dir() => {
                return Err(DatasetError::configuration(format!(
                    "dataset path {} is not a directory",
                    self.dataset_dir.display()
                )));
            }
            Ok(meta) if meta.permissions().readonly() => {
                return Err(DatasetError::configuration(format!(
                    "dataset directory {} is not writable",
                    self.dataset_dir.display()
                )));
            }
            Ok(_) => {}
            Err(_) if self.create_dataset_dir => {}
            Err(e) => {
                return Err(DatasetError::configuration(format!(
                    "dataset directory {}: {e}",
                    self.dataset_dir.display()
                )));
            }
        }

        if self.resolution < 2 {
            return Err(DatasetError::configuration(format!(
                "resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        let level = self.effective_level();
        if !level.is_finite() || level < 0.0 {
            return Err(DatasetError::configuration(format!(
                "level must be finite and non-negative, got {level}"
            )));
        }
        if !(self.mesh_scale > 0.0 && self.mesh_scale <= 1.0) {
            return Err(DatasetError::configuration(format!(
                "mesh_scale must be in (0, 1], got {}",
                self.mesh_scale
            )));
        }
        if !(self.shape_scale > 0.0 && self.shape_scale.is_finite()) {
            return Err(DatasetError::configuration(format!(
                "shape_scale must be positive, got {}",
                self.shape_scale
            )));
        }
        if self.extensions.is_empty() || self.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(DatasetError::configuration(
                "at least one non-empty extension is required",
            ));
        }
        Ok(())
    }

    /// Accepted extensions lower-cased, without leading dots, duplicates
    /// dropped, priority order kept.
    #[must_use]
    pub fn normalized_extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in &self.extensions {
            let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !out.contains(&ext) {
                out.push(ext);
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn valid_dirs() -> (tempfile::TempDir, ConversionConfig) {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("raw");
        std::fs::create_dir(&input).unwrap();
        let config = ConversionConfig::new(input, tmp.path().join("sdf"));
        (tmp, config)
    }

    #[test]
    fn defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.resolution, 128);
        assert_eq!(config.effective_level(), 2.0 / 128.0);
        assert_eq!(config.mesh_scale, 0.8);
        assert_eq!(config.shape_scale, 0.5);
        assert_eq!(config.limit, None);
        assert_eq!(config.collision_policy, CollisionPolicy::Warn);
        assert!(config.create_dataset_dir);
    }

    #[test]
    fn explicit_level_wins() {
        let config = ConversionConfig::default().with_level(0.05);
        assert_eq!(config.effective_level(), 0.05);
    }

    #[test]
    fn validate_accepts_missing_dataset_dir_when_creating() {
        let (_tmp, config) = valid_dirs();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_dataset_dir_without_create() {
        let (_tmp, config) = valid_dirs();
        let config = config.with_create_dataset_dir(false);
        assert!(matches!(
            config.validate(),
            Err(DatasetError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_input_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ConversionConfig::new(tmp.path().join("nope"), tmp.path());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn validate_rejects_dataset_file() {
        let (tmp, mut config) = valid_dirs();
        let file = tmp.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        config.dataset_dir = file;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let (_tmp, config) = valid_dirs();
        assert!(config.clone().with_resolution(1).validate().is_err());
        assert!(config.clone().with_level(-1.0).validate().is_err());
        assert!(config.clone().with_mesh_scale(0.0).validate().is_err());
        assert!(config.clone().with_mesh_scale(1.5).validate().is_err());
        let no_ext: [&str; 0] = [];
        assert!(config.clone().with_extensions(no_ext).validate().is_err());
        assert!(config.with_extensions([""]).validate().is_err());
    }

    #[test]
    fn shape_scale_is_only_validated() {
        let (_tmp, config) = valid_dirs();
        let odd = ConversionConfig {
            shape_scale: 3.0,
            ..config.clone()
        };
        assert!(odd.validate().is_ok());
        assert_eq!(odd.effective_level(), config.effective_level());
        assert_eq!(odd.mesh_scale, config.mesh_scale);

        let negative = ConversionConfig {
            shape_scale: -0.5,
            ..config
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn extensions_are_normalized() {
        let config = ConversionConfig::default().with_extensions([".OBJ", "stl", "obj", "Stl"]);
        assert_eq!(config.normalized_extensions(), vec!["obj", "stl"]);
    }

    #[test]
    fn json_fills_defaults() {
        let config = ConversionConfig::from_json(
            r#"{"input_dir": "raw", "dataset_dir": "out", "resolution": 32, "collision_policy": "abort"}"#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("raw"));
        assert_eq!(config.resolution, 32);
        assert_eq!(config.collision_policy, CollisionPolicy::Abort);
        assert_eq!(config.mesh_scale, 0.8);
        assert_eq!(config.extensions, vec!["obj", "stl"]);
    }

    #[test]
    fn json_round_trip() {
        let config = ConversionConfig::new("a", "b").with_limit(7).with_level(0.1);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ConversionConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        assert!(matches!(
            ConversionConfig::from_json("{ resolution: }"),
            Err(DatasetError::Configuration(_))
        ));
    }
}
