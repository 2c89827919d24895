//! Dense cubic distance grid.

use nalgebra::Point3;

use crate::error::{SdfError, SdfResult};

/// A dense `R x R x R` grid of signed distances over the cube `[-1, 1]^3`.
///
/// Sample `(i, j, k)` sits at the center of its cell:
/// `-1 + (i + 0.5) * 2 / R` on each axis. Values are stored in C order
/// (`i` slowest, `k` fastest), the layout of a NumPy array of shape
/// `(R, R, R)` indexed `[i, j, k]`.
///
/// # Example
///
/// ```
/// use mesh_sdf::SdfGrid;
///
/// let grid = SdfGrid::new(2, vec![0.0; 8]).unwrap();
/// assert_eq!(grid.shape(), [2, 2, 2]);
/// assert_eq!(grid.index(1, 0, 1), 5);
/// assert!((grid.sample_position(0, 0, 0).x + 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SdfGrid {
    resolution: usize,
    values: Vec<f32>,
}

impl SdfGrid {
    /// Wrap a value buffer of length `resolution^3`.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::ShapeMismatch`] if the buffer length is wrong.
    pub fn new(resolution: usize, values: Vec<f32>) -> SdfResult<Self> {
        let expected = resolution.pow(3);
        if values.len() != expected {
            return Err(SdfError::ShapeMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self { resolution, values })
    }

    /// Edge length `R` of the grid.
    #[inline]
    #[must_use]
    pub const fn resolution(&self) -> usize {
        self.resolution
    }

    /// Array shape `(R, R, R)`.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> [usize; 3] {
        [self.resolution; 3]
    }

    /// Total number of samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the grid holds no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat C-order index of sample `(i, j, k)`.
    #[inline]
    #[must_use]
    pub const fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.resolution + j) * self.resolution + k
    }

    /// Value of sample `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= resolution`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[self.index(i, j, k)]
    }

    /// All values in C order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consume the grid, returning its value buffer.
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Spacing between neighboring samples, `2 / R`.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        cell_size(self.resolution)
    }

    /// Position of sample `(i, j, k)` in normalized space.
    #[must_use]
    pub fn sample_position(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        Point3::new(
            sample_coordinate(self.resolution, i),
            sample_coordinate(self.resolution, j),
            sample_coordinate(self.resolution, k),
        )
    }

    /// Whether every value is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Sample spacing for a grid of edge length `resolution` over `[-1, 1]`.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cell_size(resolution: usize) -> f64 {
    2.0 / resolution as f64
}

/// Normalized coordinate of sample index `i`.
#[inline]
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_coordinate(resolution: usize, i: usize) -> f64 {
    (i as f64 + 0.5).mul_add(cell_size(resolution), -1.0)
}

/// Continuous sample index of normalized coordinate `x` (inverse of
/// [`sample_coordinate`]).
#[inline]
#[must_use]
pub fn grid_coordinate(resolution: usize, x: f64) -> f64 {
    (x + 1.0) / cell_size(resolution) - 0.5
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            SdfGrid::new(3, vec![0.0; 26]),
            Err(SdfError::ShapeMismatch {
                expected: 27,
                got: 26
            })
        ));
    }

    #[test]
    fn c_order_indexing() {
        let values: Vec<f32> = (0..27u8).map(f32::from).collect();
        let grid = SdfGrid::new(3, values).unwrap();
        assert_eq!(grid.get(0, 0, 1), 1.0);
        assert_eq!(grid.get(0, 1, 0), 3.0);
        assert_eq!(grid.get(1, 0, 0), 9.0);
        assert_eq!(grid.get(2, 2, 2), 26.0);
    }

    #[test]
    fn samples_are_cell_centered_and_symmetric() {
        let r = 128;
        assert_relative_eq!(sample_coordinate(r, 0), -1.0 + 1.0 / 128.0);
        assert_relative_eq!(sample_coordinate(r, r - 1), 1.0 - 1.0 / 128.0);
        assert_relative_eq!(
            sample_coordinate(r, 10),
            -sample_coordinate(r, r - 1 - 10),
            epsilon = 1e-12
        );
    }

    #[test]
    fn grid_coordinate_inverts_sample_coordinate() {
        for i in [0, 7, 63, 127] {
            assert_relative_eq!(
                grid_coordinate(128, sample_coordinate(128, i)),
                i as f64,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn finiteness_check() {
        let mut values = vec![0.5f32; 8];
        assert!(SdfGrid::new(2, values.clone()).unwrap().is_finite());
        values[3] = f32::NAN;
        assert!(!SdfGrid::new(2, values).unwrap().is_finite());
    }
}
