//! Signed distance grids for triangle meshes.
//!
//! This crate turns a triangle mesh that has been normalized into the cube
//! `[-1, 1]^3` into a dense `R x R x R` grid of signed distances, negative
//! inside and positive outside, and can extract the zero level set back out
//! as a closed mesh.
//!
//! Raw meshes are rarely watertight. With repair enabled ([`SdfParams::fix`])
//! the sign does not depend on face winding: the unsigned distance is offset
//! by a small level, and everything the grid boundary cannot reach through
//! samples farther than that level from the mesh counts as inside.
//!
//! # Example
//!
//! ```
//! use mesh_sdf::{compute_sdf, SdfParams};
//! use mesh_types::{unit_cube, MeshTopology};
//!
//! let mut cube = unit_cube();
//! for v in &mut cube.vertices {
//!     v.position = v.position.map(|c| c - 0.5);
//! }
//!
//! let out = compute_sdf(&cube, &SdfParams::new(16)).unwrap();
//! assert_eq!(out.grid.shape(), [16, 16, 16]);
//!
//! let surface = out.mesh.unwrap();
//! assert!(surface.face_count() > 0);
//! ```
//!
//! # Grid Layout
//!
//! See [`SdfGrid`]: cell-centered samples, C order, `f32` values.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod compute;
mod error;
mod grid;
mod query;
mod surface;

pub use compute::{DEGENERATE_AREA, SdfOutput, SdfParams, compute_sdf};
pub use error::{SdfError, SdfResult};
pub use grid::{SdfGrid, cell_size, grid_coordinate, sample_coordinate};
pub use query::{closest_point_on_triangle, face_side, point_triangle_distance_squared};
pub use surface::extract_surface;
