use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use tracing::{debug, info};

use ml_sdf_dataset::{BatchDriver, CollisionPolicy, ConversionConfig};

/// Convert raw OBJ/STL meshes into normalized signed distance grids,
/// repaired meshes and bounding box records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the raw meshes
    input_dir: PathBuf,

    /// Directory receiving the dataset artifacts
    dataset_dir: PathBuf,

    /// Accepted extension, highest priority first (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Grid edge length
    #[arg(short, long)]
    resolution: Option<usize>,

    /// Iso-level in normalized units (default: 2 / resolution)
    #[arg(long)]
    level: Option<f64>,

    /// Half-extent the longest mesh axis is scaled to
    #[arg(long)]
    mesh_scale: Option<f64>,

    /// Convert at most this many inputs
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Abort if two inputs map to the same model key
    #[arg(long)]
    strict_keys: bool,

    /// Fail instead of creating a missing dataset directory
    #[arg(long)]
    no_create: bool,

    /// JSON config file; command-line values take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the batch report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(ConversionConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::from_json_file(path)?,
            None => ConversionConfig::default(),
        };

        config.input_dir = self.input_dir;
        config.dataset_dir = self.dataset_dir;
        if !self.extensions.is_empty() {
            config.extensions = self.extensions;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(level) = self.level {
            config.level = Some(level);
        }
        if let Some(mesh_scale) = self.mesh_scale {
            config.mesh_scale = mesh_scale;
        }
        if let Some(limit) = self.limit {
            config.limit = Some(limit);
        }
        if self.strict_keys {
            config.collision_policy = CollisionPolicy::Abort;
        }
        if self.no_create {
            config.create_dataset_dir = false;
        }
        Ok((config, self.report))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let (config, report_path) = Args::parse().into_config()?;

    let report = BatchDriver::new(config).run()?;

    info!(
        "done: {} processed, {} skipped, {} failed",
        report.processed, report.skipped, report.failed
    );
    for failure in &report.failures {
        debug!("failed: {}: {}", failure.path.display(), failure.cause);
    }

    if let Some(path) = report_path {
        let file = File::create(&path)
            .with_context(|| format!("failed to create report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "mesh2sdf",
            "raw",
            "out",
            "--ext",
            "stl",
            "-r",
            "64",
            "-n",
            "3",
            "--strict-keys",
            "--no-create",
            "--report",
            "report.json",
        ])
        .unwrap();
        let (config, report) = args.into_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("raw"));
        assert_eq!(config.dataset_dir, PathBuf::from("out"));
        assert_eq!(config.extensions, vec!["stl"]);
        assert_eq!(config.resolution, 64);
        assert_eq!(config.limit, Some(3));
        assert_eq!(config.collision_policy, CollisionPolicy::Abort);
        assert!(!config.create_dataset_dir);
        assert_eq!(report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn defaults_without_flags() {
        let args = Args::try_parse_from(["mesh2sdf", "raw", "out"]).unwrap();
        let (config, report) = args.into_config().unwrap();
        assert_eq!(config.resolution, 128);
        assert_eq!(config.extensions, vec!["obj", "stl"]);
        assert_eq!(config.collision_policy, CollisionPolicy::Warn);
        assert!(config.create_dataset_dir);
        assert!(report.is_none());
    }
}
