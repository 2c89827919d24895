//! Dense signed distance computation with optional watertight repair.
//!
//! The kernel runs in three passes:
//!
//! 1. **Band** - exact point-triangle distances for samples within one cell
//!    of each triangle's bounding box.
//! 2. **Sweep** - fast sweeping over the eight diagonal orders, handing each
//!    sample the closest triangle known to any already-visited neighbor.
//!    Every sample ends up with an exact distance to some triangle.
//! 3. **Sign** - either a flood fill of the `level` offset surface from the
//!    grid boundary (repair), or the side of the closest face.
//! 4. **Redistance** - when repairing, the offset surface is extracted and
//!    the first two passes run again against it, so every value is a signed
//!    distance to the repaired surface.

use std::collections::VecDeque;

use mesh_types::{IndexedMesh, MeshTopology, Triangle};
use nalgebra::Point3;
use tracing::debug;

use crate::error::{SdfError, SdfResult};
use crate::grid::{SdfGrid, grid_coordinate, sample_coordinate};
use crate::query::{face_side, point_triangle_distance_squared};
use crate::surface::extract_surface;

/// Faces with area at or below this (in normalized units) are discarded.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Extra cells around each triangle's bounding box that get exact distances.
const EXACT_BAND: i64 = 1;

/// Full passes of the eight sweep orders.
const SWEEP_ROUNDS: usize = 2;

const NO_TRIANGLE: u32 = u32::MAX;

/// Parameters for [`compute_sdf`].
///
/// # Example
///
/// ```
/// use mesh_sdf::SdfParams;
///
/// let params = SdfParams::new(64);
/// assert!((params.level - 2.0 / 64.0).abs() < 1e-12);
/// assert!(params.fix);
/// assert!(params.return_mesh);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SdfParams {
    /// Grid edge length `R`.
    pub resolution: usize,
    /// Iso-level subtracted from the unsigned distance when repairing.
    pub level: f64,
    /// Classify inside/outside by flood fill (watertight repair).
    pub fix: bool,
    /// Extract the repaired surface as a mesh.
    pub return_mesh: bool,
}

impl Default for SdfParams {
    fn default() -> Self {
        Self::new(128)
    }
}

impl SdfParams {
    /// Parameters for resolution `R` with the recommended level `2 / R`.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            level: crate::grid::cell_size(resolution.max(1)),
            fix: true,
            return_mesh: true,
        }
    }

    /// Set the iso-level.
    #[must_use]
    pub const fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable flood-fill repair.
    #[must_use]
    pub const fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// Enable or disable surface extraction.
    #[must_use]
    pub const fn with_return_mesh(mut self, return_mesh: bool) -> Self {
        self.return_mesh = return_mesh;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::InvalidParams`] if the resolution is below 2 or the
    /// level is negative or not finite.
    pub fn validate(&self) -> SdfResult<()> {
        if self.resolution < 2 {
            return Err(SdfError::InvalidParams(format!(
                "resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if !self.level.is_finite() || self.level < 0.0 {
            return Err(SdfError::InvalidParams(format!(
                "level must be finite and non-negative, got {}",
                self.level
            )));
        }
        Ok(())
    }
}

/// Result of [`compute_sdf`].
#[derive(Debug, Clone)]
pub struct SdfOutput {
    /// Signed distance grid.
    pub grid: SdfGrid,
    /// Repaired surface, present when `return_mesh` was requested.
    pub mesh: Option<IndexedMesh>,
}

/// Compute a dense signed distance grid for a mesh in normalized space.
///
/// Vertices are expected inside roughly `[-1, 1]^3`; anything outside the
/// grid still contributes distances but cannot be resolved by it.
///
/// # Errors
///
/// - [`SdfError::InvalidParams`] for a bad resolution or level
/// - [`SdfError::EmptyMesh`] if the mesh has no faces
/// - [`SdfError::InvalidIndex`] if a face references a missing vertex
/// - [`SdfError::NonFinite`] for NaN/infinite coordinates or distances
/// - [`SdfError::DegenerateMesh`] if every face has zero area
/// - [`SdfError::EmptySurface`] if the requested surface has no faces
///
/// # Example
///
/// ```
/// use mesh_sdf::{compute_sdf, SdfParams};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// for v in &mut cube.vertices {
///     v.position = v.position.map(|c| (c - 0.5) * 1.6);
/// }
///
/// let out = compute_sdf(&cube, &SdfParams::new(16)).unwrap();
/// assert_eq!(out.grid.len(), 16 * 16 * 16);
/// assert!(out.grid.get(8, 8, 8) < 0.0);
/// assert!(out.grid.get(0, 0, 0) > 0.0);
/// assert!(out.mesh.is_some());
/// ```
pub fn compute_sdf(mesh: &IndexedMesh, params: &SdfParams) -> SdfResult<SdfOutput> {
    params.validate()?;

    if mesh.faces.is_empty() {
        return Err(SdfError::EmptyMesh);
    }
    if let Some((face, indices)) = mesh.first_invalid_face() {
        let index = indices
            .into_iter()
            .find(|&i| i as usize >= mesh.vertex_count())
            .unwrap_or(indices[0]);
        return Err(SdfError::InvalidIndex {
            face,
            index,
            vertex_count: mesh.vertex_count(),
        });
    }
    if !mesh.vertices.iter().all(mesh_types::Vertex::is_finite) {
        return Err(SdfError::NonFinite("vertex coordinates"));
    }

    let triangles: Vec<Triangle> = mesh
        .triangles()
        .filter(|tri| !tri.is_degenerate(DEGENERATE_AREA))
        .collect();
    if triangles.is_empty() {
        return Err(SdfError::DegenerateMesh {
            faces: mesh.face_count(),
        });
    }
    debug!(
        faces = mesh.face_count(),
        kept = triangles.len(),
        resolution = params.resolution,
        "computing distance grid"
    );

    let field = DistanceField::compute(&triangles, params.resolution);

    let (grid, repaired) = if params.fix {
        let (grid, surface) = repair(&field, params.level)?;
        (grid, Some(surface))
    } else {
        (to_grid(params.resolution, &field.face_sign(&triangles))?, None)
    };

    let mesh = if params.return_mesh {
        let surface = match repaired {
            Some(surface) => surface,
            None => extract_surface(&grid, 0.0),
        };
        if surface.faces.is_empty() {
            return Err(SdfError::EmptySurface);
        }
        debug!(
            vertices = surface.vertex_count(),
            faces = surface.face_count(),
            "extracted repaired surface"
        );
        Some(surface)
    } else {
        None
    };

    Ok(SdfOutput { grid, mesh })
}

/// Watertight repair of `field` at `level`.
///
/// Extracts the boundary between outside and enclosed samples of `udf - level`
/// and measures distances against it. When that boundary is empty the
/// offset values are returned as they are.
fn repair(field: &DistanceField, level: f64) -> SdfResult<(SdfGrid, IndexedMesh)> {
    let outside = field.outside_samples(level);
    let offset = SdfGrid::new(field.resolution, field.offset_values(level, &outside))?;
    let surface = extract_surface(&offset, 0.0);

    let triangles: Vec<Triangle> = surface
        .triangles()
        .filter(|tri| !tri.is_degenerate(DEGENERATE_AREA))
        .collect();
    if triangles.is_empty() {
        return Ok((check_finite(offset)?, surface));
    }

    let repaired = DistanceField::compute(&triangles, field.resolution);
    let grid = to_grid(field.resolution, &repaired.signed_by(&outside))?;
    Ok((grid, surface))
}

fn to_grid(resolution: usize, values: &[f64]) -> SdfResult<SdfGrid> {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: the grid is stored as f32, distances are bounded by the grid diagonal
    let values: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    check_finite(SdfGrid::new(resolution, values)?)
}

fn check_finite(grid: SdfGrid) -> SdfResult<SdfGrid> {
    if grid.is_finite() {
        Ok(grid)
    } else {
        Err(SdfError::NonFinite("distance grid"))
    }
}

/// Unsigned distances plus the triangle each one was measured against.
struct DistanceField {
    resolution: usize,
    distance: Vec<f64>,
    closest: Vec<u32>,
}

impl DistanceField {
    fn compute(triangles: &[Triangle], resolution: usize) -> Self {
        let cells = resolution.pow(3);
        let mut field = Self {
            resolution,
            distance: vec![f64::INFINITY; cells],
            closest: vec![NO_TRIANGLE; cells],
        };

        field.fill_band(triangles);
        if field.closest.iter().all(|&t| t == NO_TRIANGLE) {
            // Nothing landed inside the grid: seed one sample by brute force.
            field.seed(triangles);
        }
        for _ in 0..SWEEP_ROUNDS {
            for &(di, dj, dk) in &SWEEP_ORDERS {
                field.sweep(triangles, di, dj, dk);
            }
        }
        field.fill_unreached(triangles);
        field
    }

    #[inline]
    const fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.resolution + j) * self.resolution + k
    }

    fn position(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        Point3::new(
            sample_coordinate(self.resolution, i),
            sample_coordinate(self.resolution, j),
            sample_coordinate(self.resolution, k),
        )
    }

    /// Sample index range covering `[lo, hi]` plus the exact band, or `None`
    /// when it misses the grid.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn sample_range(&self, lo: f64, hi: f64) -> Option<(usize, usize)> {
        let last = self.resolution as i64 - 1;
        let start = (grid_coordinate(self.resolution, lo).floor() as i64 - EXACT_BAND).max(0);
        let end = (grid_coordinate(self.resolution, hi).ceil() as i64 + EXACT_BAND).min(last);
        (start <= end).then_some((start as usize, end as usize))
    }

    fn fill_band(&mut self, triangles: &[Triangle]) {
        for (tri, t) in triangles.iter().zip(0u32..) {
            let lo = tri.v0.inf(&tri.v1).inf(&tri.v2);
            let hi = tri.v0.sup(&tri.v1).sup(&tri.v2);
            let (Some(ri), Some(rj), Some(rk)) = (
                self.sample_range(lo.x, hi.x),
                self.sample_range(lo.y, hi.y),
                self.sample_range(lo.z, hi.z),
            ) else {
                continue;
            };

            for i in ri.0..=ri.1 {
                for j in rj.0..=rj.1 {
                    for k in rk.0..=rk.1 {
                        let p = self.position(i, j, k);
                        let d = point_triangle_distance_squared(p, tri).sqrt();
                        let idx = self.index(i, j, k);
                        if d < self.distance[idx] {
                            self.distance[idx] = d;
                            self.closest[idx] = t;
                        }
                    }
                }
            }
        }
    }

    fn seed(&mut self, triangles: &[Triangle]) {
        if let Some((t, d2)) = closest_triangle(self.position(0, 0, 0), triangles) {
            self.distance[0] = d2.sqrt();
            self.closest[0] = t;
        }
    }

    /// Brute-force any sample the sweeps did not reach.
    fn fill_unreached(&mut self, triangles: &[Triangle]) {
        let n = self.resolution;
        let mut unreached = 0usize;
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let idx = self.index(i, j, k);
                    if self.closest[idx] != NO_TRIANGLE {
                        continue;
                    }
                    let p = self.position(i, j, k);
                    if let Some((t, d2)) = closest_triangle(p, triangles) {
                        self.distance[idx] = d2.sqrt();
                        self.closest[idx] = t;
                        unreached += 1;
                    }
                }
            }
        }
        if unreached > 0 {
            debug!(unreached, "filled samples missed by sweeping");
        }
    }

    /// One fast-sweeping pass in direction `(di, dj, dk)`, each `+1` or `-1`.
    fn sweep(&mut self, triangles: &[Triangle], di: i64, dj: i64, dk: i64) {
        let n = self.resolution;
        let order = |d: i64| -> Box<dyn Iterator<Item = usize>> {
            if d > 0 {
                Box::new(1..n)
            } else {
                Box::new((0..n - 1).rev())
            }
        };
        let step = |x: usize, d: i64| if d > 0 { x - 1 } else { x + 1 };

        for i in order(di) {
            for j in order(dj) {
                for k in order(dk) {
                    let (pi, pj, pk) = (step(i, di), step(j, dj), step(k, dk));
                    let neighbors = [
                        (pi, j, k),
                        (i, pj, k),
                        (i, j, pk),
                        (pi, pj, k),
                        (pi, j, pk),
                        (i, pj, pk),
                        (pi, pj, pk),
                    ];
                    let idx = self.index(i, j, k);
                    let p = self.position(i, j, k);
                    for (ni, nj, nk) in neighbors {
                        let t = self.closest[self.index(ni, nj, nk)];
                        if t == NO_TRIANGLE || t == self.closest[idx] {
                            continue;
                        }
                        let d = point_triangle_distance_squared(p, &triangles[t as usize]).sqrt();
                        if d < self.distance[idx] {
                            self.distance[idx] = d;
                            self.closest[idx] = t;
                        }
                    }
                }
            }
        }
    }

    /// Samples outside the `level` offset surface.
    ///
    /// Samples farther than `level` from the mesh and connected to the grid
    /// boundary are outside; every other sample is enclosed.
    fn outside_samples(&self, level: f64) -> Vec<bool> {
        let n = self.resolution;
        let mut outside = vec![false; self.distance.len()];
        let mut queue = VecDeque::new();

        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let on_boundary = [i, j, k].iter().any(|&c| c == 0 || c == n - 1);
                    let idx = self.index(i, j, k);
                    if on_boundary && self.distance[idx] > level {
                        outside[idx] = true;
                        queue.push_back((i, j, k));
                    }
                }
            }
        }

        while let Some((i, j, k)) = queue.pop_front() {
            for (ni, nj, nk) in face_neighbors(i, j, k, n) {
                let idx = self.index(ni, nj, nk);
                if !outside[idx] && self.distance[idx] > level {
                    outside[idx] = true;
                    queue.push_back((ni, nj, nk));
                }
            }
        }

        let enclosed = outside.iter().filter(|&&o| !o).count();
        debug!(enclosed, "flood fill classified enclosed samples");
        outside
    }

    /// `udf - level` with enclosed samples forced strictly negative and
    /// outside samples strictly positive.
    #[allow(clippy::cast_possible_truncation)]
    fn offset_values(&self, level: f64, outside: &[bool]) -> Vec<f32> {
        self.distance
            .iter()
            .zip(outside)
            .map(|(&d, &is_outside)| {
                let magnitude = ((d - level).abs() as f32).max(f32::MIN_POSITIVE);
                if is_outside { magnitude } else { -magnitude }
            })
            .collect()
    }

    /// Distances signed by an outside/enclosed classification.
    fn signed_by(&self, outside: &[bool]) -> Vec<f64> {
        self.distance
            .iter()
            .zip(outside)
            .map(|(&d, &is_outside)| if is_outside { d } else { -d })
            .collect()
    }

    /// Signed values from the side of the closest face.
    fn face_sign(&self, triangles: &[Triangle]) -> Vec<f64> {
        let n = self.resolution;
        let mut values = Vec::with_capacity(self.distance.len());
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let idx = self.index(i, j, k);
                    let tri = &triangles[self.closest[idx] as usize];
                    values.push(face_side(self.position(i, j, k), tri) * self.distance[idx]);
                }
            }
        }
        values
    }
}

/// Index and squared distance of the triangle closest to `p`.
fn closest_triangle(p: Point3<f64>, triangles: &[Triangle]) -> Option<(u32, f64)> {
    triangles
        .iter()
        .zip(0u32..)
        .map(|(tri, t)| (t, point_triangle_distance_squared(p, tri)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

const SWEEP_ORDERS: [(i64, i64, i64); 8] = [
    (1, 1, 1),
    (-1, -1, -1),
    (1, 1, -1),
    (-1, -1, 1),
    (1, -1, 1),
    (-1, 1, -1),
    (1, -1, -1),
    (-1, 1, 1),
];

/// In-bounds 6-neighbors of sample `(i, j, k)` on an `n^3` grid.
fn face_neighbors(
    i: usize,
    j: usize,
    k: usize,
    n: usize,
) -> impl Iterator<Item = (usize, usize, usize)> {
    let candidates = [
        (i.checked_sub(1), Some(j), Some(k)),
        ((i + 1 < n).then_some(i + 1), Some(j), Some(k)),
        (Some(i), j.checked_sub(1), Some(k)),
        (Some(i), (j + 1 < n).then_some(j + 1), Some(k)),
        (Some(i), Some(j), k.checked_sub(1)),
        (Some(i), Some(j), (k + 1 < n).then_some(k + 1)),
    ];
    candidates
        .into_iter()
        .filter_map(|(a, b, c)| Some((a?, b?, c?)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hashbrown::HashMap;
    use mesh_types::{Vertex, unit_cube};

    /// Unit cube rescaled to `[-0.8, 0.8]^3`.
    fn normalized_cube() -> IndexedMesh {
        let mut cube = unit_cube();
        for v in &mut cube.vertices {
            v.position = v.position.map(|c| (c - 0.5) * 1.6);
        }
        cube
    }

    fn edge_use_counts(mesh: &IndexedMesh) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::new();
        for &[a, b, c] in &mesh.faces {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *counts.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn params_validation() {
        assert!(SdfParams::new(1).validate().is_err());
        assert!(SdfParams::new(8).with_level(-0.1).validate().is_err());
        assert!(SdfParams::new(8).with_level(f64::NAN).validate().is_err());
        assert!(SdfParams::new(8).validate().is_ok());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let result = compute_sdf(&IndexedMesh::new(), &SdfParams::new(8));
        assert!(matches!(result, Err(SdfError::EmptyMesh)));
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut cube = normalized_cube();
        cube.faces.push([0, 1, 40]);
        let result = compute_sdf(&cube, &SdfParams::new(8));
        assert!(matches!(
            result,
            Err(SdfError::InvalidIndex {
                face: 12,
                index: 40,
                vertex_count: 8
            })
        ));
    }

    #[test]
    fn nan_vertex_is_rejected() {
        let mut cube = normalized_cube();
        cube.vertices[3] = Vertex::from_coords(f64::NAN, 0.0, 0.0);
        let result = compute_sdf(&cube, &SdfParams::new(8));
        assert!(matches!(result, Err(SdfError::NonFinite(_))));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.8, 0.0, 0.0], &[0, 1, 2]);
        let result = compute_sdf(&mesh, &SdfParams::new(8));
        assert!(matches!(result, Err(SdfError::DegenerateMesh { faces: 1 })));
    }

    #[test]
    fn cube_grid_signs() {
        let out = compute_sdf(&normalized_cube(), &SdfParams::new(16)).unwrap();
        let grid = &out.grid;
        assert_eq!(grid.shape(), [16, 16, 16]);
        assert!(grid.is_finite());
        assert!(grid.get(8, 8, 8) < 0.0);
        assert!(grid.get(0, 0, 0) > 0.0);
        assert!(grid.get(15, 0, 15) > 0.0);
    }

    #[test]
    fn fix_values_measure_distance_to_offset_surface() {
        let params = SdfParams::new(16);
        let out = compute_sdf(&normalized_cube(), &params).unwrap();
        let offset = 0.8 + params.level;

        // Just outside the -x face of the offset cube.
        let p = out.grid.sample_position(0, 8, 8);
        assert_relative_eq!(
            f64::from(out.grid.get(0, 8, 8)),
            -offset - p.x,
            epsilon = 1e-4
        );

        // Walking inward along x, values fall steadily until the axis meets
        // the center, where samples 7 and 8 are mirror images.
        let mut previous = f64::from(out.grid.get(0, 8, 8));
        for i in 1..=8 {
            let p = out.grid.sample_position(i, 8, 8);
            let expected = p.x.abs().max(p.y.abs()).max(p.z.abs()) - offset;
            let value = f64::from(out.grid.get(i, 8, 8));
            // Interior samples take their triangle from sweeping, exact up to
            // the choice between neighboring quads of a face.
            assert_relative_eq!(value, expected, epsilon = 0.02);
            if i < 8 {
                assert!(value < previous, "sample {i}: {value} >= {previous}");
            }
            previous = value;
        }
    }

    #[test]
    fn sweep_reaches_far_samples_exactly() {
        // A small triangle near one corner: the opposite corner only gets a
        // distance through sweeping.
        let mesh = IndexedMesh::from_raw(
            &[-0.9, -0.9, -0.9, -0.8, -0.9, -0.9, -0.9, -0.8, -0.9],
            &[0, 1, 2],
        );
        let params = SdfParams::new(12).with_fix(false).with_return_mesh(false);
        let out = compute_sdf(&mesh, &params).unwrap();
        let far = out.grid.sample_position(11, 11, 11);
        let tri = mesh.triangle(0).unwrap();
        let exact = point_triangle_distance_squared(far, &tri).sqrt();
        assert_relative_eq!(f64::from(out.grid.get(11, 11, 11)).abs(), exact, epsilon = 1e-5);
        assert!(out.mesh.is_none());
    }

    #[test]
    fn face_sign_matches_winding() {
        let params = SdfParams::new(12).with_fix(false).with_return_mesh(false);
        let out = compute_sdf(&normalized_cube(), &params).unwrap();
        assert!(out.grid.get(6, 6, 6) < 0.0);
        assert!(out.grid.get(0, 6, 6) > 0.0);
    }

    #[test]
    fn fix_ignores_inconsistent_winding() {
        let mut cube = normalized_cube();
        for face in cube.faces.iter_mut().step_by(2) {
            face.swap(1, 2);
        }
        let out = compute_sdf(&cube, &SdfParams::new(12)).unwrap();
        assert!(out.grid.get(6, 6, 6) < 0.0);
        assert!(out.grid.get(0, 0, 0) > 0.0);
    }

    #[test]
    fn repaired_cube_surface_is_closed() {
        let out = compute_sdf(&normalized_cube(), &SdfParams::new(16)).unwrap();
        let surface = out.mesh.unwrap();
        assert!(surface.first_invalid_face().is_none());
        assert!(!surface.faces.is_empty());

        for (edge, count) in edge_use_counts(&surface) {
            assert_eq!(count, 2, "edge {edge:?} used {count} times");
        }

        // Outward orientation and roughly the offset cube's volume.
        let volume = surface.signed_volume();
        let nominal = 1.6f64.powi(3);
        assert!(volume > 0.8 * nominal, "volume {volume}");
        assert!(volume < 2.0 * nominal, "volume {volume}");
    }

    #[test]
    fn surface_stays_inside_unit_cube() {
        let out = compute_sdf(&normalized_cube(), &SdfParams::new(16)).unwrap();
        let surface = out.mesh.unwrap();
        for v in &surface.vertices {
            assert!(v.position.iter().all(|c| c.abs() <= 1.0));
        }
    }

    #[test]
    fn mesh_outside_grid_still_yields_finite_grid() {
        let mesh = IndexedMesh::from_raw(&[5.0, 5.0, 5.0, 6.0, 5.0, 5.0, 5.0, 6.0, 5.0], &[0, 1, 2]);
        let params = SdfParams::new(6).with_fix(false).with_return_mesh(false);
        let out = compute_sdf(&mesh, &params).unwrap();
        assert!(out.grid.is_finite());
        assert!(out.grid.values().iter().all(|v| v.abs() > 3.0));
    }

    #[test]
    fn nothing_enclosed_gives_empty_surface() {
        // Level zero and a single open triangle: nothing is inside.
        let mesh = IndexedMesh::from_raw(
            &[-0.5, -0.5, 0.01, 0.5, -0.5, 0.01, 0.0, 0.5, 0.01],
            &[0, 1, 2],
        );
        let params = SdfParams::new(8).with_level(0.0);
        assert!(matches!(
            compute_sdf(&mesh, &params),
            Err(SdfError::EmptySurface)
        ));
    }
}
