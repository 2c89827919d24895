//! Centering and uniform scaling of meshes into the SDF grid cube.

use mesh_types::{Aabb, IndexedMesh, Vertex};
use nalgebra::Point3;

use crate::error::{DatasetError, Result};

/// Original-space bounds of a mesh plus the scale applied to it.
///
/// Together these invert normalization:
/// `original = normalized / mul + (bbmin + bbmax) / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Per-axis minimum of the original vertices.
    pub bbmin: Point3<f64>,
    /// Per-axis maximum of the original vertices.
    pub bbmax: Point3<f64>,
    /// Uniform scale factor applied after centering.
    pub mul: f64,
}

impl BoundingBox {
    /// Center of the original bounds.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.bbmin, &self.bbmax)
    }

    /// Map an original-space point into normalized space.
    #[must_use]
    pub fn to_normalized(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from((p - self.center()) * self.mul)
    }

    /// Map a normalized point back into original space.
    #[must_use]
    pub fn to_original(&self, p: &Point3<f64>) -> Point3<f64> {
        self.center() + p.coords / self.mul
    }
}

/// Center a mesh on the origin and scale it so its longest axis spans
/// `[-half_extent, half_extent]`.
///
/// Other axes shrink by the same factor, so aspect ratio is preserved.
/// Faces are carried over unchanged. The returned [`BoundingBox`] records
/// the original bounds and the scale factor actually applied.
///
/// # Errors
///
/// Returns [`DatasetError::DegenerateGeometry`] if the mesh has no vertices,
/// a non-finite coordinate, or zero extent on every axis.
///
/// # Example
///
/// ```
/// use ml_sdf_dataset::normalize;
/// use mesh_types::unit_cube;
///
/// let (mesh, bbox) = normalize(&unit_cube(), 0.8).unwrap();
/// assert!((bbox.mul - 1.6).abs() < 1e-12);
/// assert!(mesh.vertices.iter().all(|v| v.position.x.abs() <= 0.8 + 1e-12));
/// ```
pub fn normalize(mesh: &IndexedMesh, half_extent: f64) -> Result<(IndexedMesh, BoundingBox)> {
    if mesh.vertices.is_empty() {
        return Err(DatasetError::degenerate("mesh has no vertices"));
    }
    if !mesh.vertices.iter().all(Vertex::is_finite) {
        return Err(DatasetError::degenerate("mesh has non-finite vertex coordinates"));
    }

    let bounds = Aabb::from_points(mesh.vertices.iter().map(|v| &v.position));
    let extent = bounds.max_extent();
    if !(extent > 0.0 && extent.is_finite()) {
        return Err(DatasetError::degenerate(format!(
            "bounding box has zero extent at {:?}",
            bounds.min.coords.as_slice()
        )));
    }

    let mul = 2.0 * half_extent / extent;
    if !mul.is_finite() {
        return Err(DatasetError::degenerate(format!(
            "scale factor overflows for extent {extent:e}"
        )));
    }

    let bbox = BoundingBox {
        bbmin: bounds.min,
        bbmax: bounds.max,
        mul,
    };
    let vertices = mesh
        .vertices
        .iter()
        .map(|v| Vertex::new(bbox.to_normalized(&v.position)))
        .collect();

    Ok((IndexedMesh::from_parts(vertices, mesh.faces.clone()), bbox))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshBounds, unit_cube};
    use proptest::prelude::*;

    #[test]
    fn box_is_centered_and_longest_axis_fills() {
        let mesh = IndexedMesh::from_raw(
            &[10.0, 20.0, 30.0, 14.0, 21.0, 30.5, 12.0, 22.0, 31.0],
            &[0, 1, 2],
        );
        let (normalized, bbox) = normalize(&mesh, 0.8).unwrap();
        let b = normalized.bounds();

        assert_relative_eq!(b.size().x, 1.6, epsilon = 1e-12);
        assert_relative_eq!(b.size().y, 0.8, epsilon = 1e-12);
        assert_relative_eq!(b.center().coords.norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.mul, 0.4);
        assert_eq!(bbox.bbmin, Point3::new(10.0, 20.0, 30.0));
        assert_eq!(bbox.bbmax, Point3::new(14.0, 22.0, 31.0));
        assert_eq!(normalized.faces, mesh.faces);
    }

    #[test]
    fn round_trip_recovers_original() {
        let mut cube = unit_cube();
        cube.scale(7.0);
        let (normalized, bbox) = normalize(&cube, 0.8).unwrap();
        for (n, o) in normalized.vertices.iter().zip(&cube.vertices) {
            let back = bbox.to_original(&n.position);
            assert_relative_eq!(back, o.position, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_point_is_degenerate() {
        let mesh = IndexedMesh::from_raw(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0], &[0, 1, 2]);
        assert!(matches!(
            normalize(&mesh, 0.8),
            Err(DatasetError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn empty_mesh_is_degenerate() {
        assert!(matches!(
            normalize(&IndexedMesh::new(), 0.8),
            Err(DatasetError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn nan_vertex_is_degenerate() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
        assert!(normalize(&mesh, 0.8).is_err());
    }

    #[test]
    fn flat_mesh_is_not_degenerate() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0], &[0, 1, 2]);
        let (normalized, _) = normalize(&mesh, 0.5).unwrap();
        assert!(normalized.vertices.iter().all(|v| v.position.z == 0.0));
    }

    proptest! {
        #[test]
        fn normalization_invariants(
            coords in prop::collection::vec(-1.0e3f64..1.0e3, 9..60),
            half_extent in 0.1f64..1.0,
        ) {
            let n = coords.len() / 3 * 3;
            let mesh = IndexedMesh::from_raw(&coords[..n], &[0, 1, 2]);
            let bounds = mesh.bounds();
            prop_assume!(bounds.max_extent() > 1.0);

            let (normalized, bbox) = normalize(&mesh, half_extent).unwrap();
            let b = normalized.bounds();
            let tol = 1e-9;

            prop_assert!((b.max_extent() - 2.0 * half_extent).abs() < tol);
            prop_assert!(b.center().coords.norm() < tol);

            for (p, o) in normalized.vertices.iter().zip(&mesh.vertices) {
                let back = bbox.to_original(&p.position);
                prop_assert!((back - o.position).norm() < 1e-9 * (1.0 + o.position.coords.norm()));
            }
        }
    }
}
