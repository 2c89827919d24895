//! Conversion of raw mesh directories into signed distance field datasets.
//!
//! Every input mesh becomes a triple of artifacts in the dataset directory,
//! named after its model key:
//!
//! - `box_<key>.npz` - original bounds and applied scale (`bbmin`, `bbmax`,
//!   `mul`), enough to map normalized coordinates back
//! - `sdf_<key>.npy` - `R x R x R` float32 signed distance grid
//! - `mesh_<key>.obj` - watertight repaired mesh, normalized space
//!
//! # Pipeline
//!
//! - [`BatchDriver`] - discovers inputs, checks model keys, runs jobs in order
//! - [`ConversionJob`] - load, skip check, normalize, convert, persist
//! - [`sanitize`] / [`KeyRegistry`] - model keys and collision detection
//! - [`ArtifactPaths`] - where an item's artifacts live
//! - [`normalize`] / [`BoundingBox`] - centering, scaling and its inverse
//! - [`SdfConverter`] - the SDF capability with run-wide parameters
//!
//! # Resumability
//!
//! The metadata archive is written last and its presence marks an item as
//! complete. Rerunning over a partly built dataset converts only what is
//! missing; an item interrupted mid-write has no metadata and is redone.
//!
//! # Example
//!
//! ```no_run
//! use ml_sdf_dataset::{BatchDriver, ConversionConfig};
//!
//! let config = ConversionConfig::new("skulls-raw", "skulls-sdf");
//! let report = BatchDriver::new(config).run()?;
//! assert!(report.is_clean());
//! # Ok::<(), ml_sdf_dataset::DatasetError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod batch;
mod config;
mod error;
mod invoker;
mod job;
mod loader;
mod normalize;
pub mod npy;
mod paths;
mod persist;
mod report;
mod sanitize;

pub use batch::{BatchDriver, BatchPlan, discover_inputs};
pub use config::{CollisionPolicy, ConversionConfig};
pub use error::{DatasetError, Result};
pub use invoker::{Converted, DenseSdfBackend, SdfBackend, SdfConverter};
pub use job::{ConversionJob, JobOutcome, JobState};
pub use loader::{FileMeshLoader, MeshLoader, check_face_indices};
pub use normalize::{BoundingBox, normalize};
pub use paths::ArtifactPaths;
pub use persist::{persist_artifacts, read_metadata, staging_path, write_atomic};
pub use report::{BatchReport, ItemFailure};
pub use sanitize::{KeyCollision, KeyRegistry, ModelKey, sanitize, sanitize_path};
