//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};

/// An indexed triangle mesh.
///
/// Stores vertices and faces separately, with faces referencing vertices
/// by index. A well-formed mesh has every face index below
/// [`MeshTopology::vertex_count`]; see [`IndexedMesh::first_invalid_face`].
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from raw coordinate and index data.
    ///
    /// * `positions` - Flat array of vertex positions `[x0, y0, z0, x1, ...]`
    /// * `indices` - Flat array of face indices `[v0a, v1a, v2a, v0b, ...]`
    ///
    /// Returns an empty mesh if either length is not divisible by 3.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = IndexedMesh::from_raw(&positions, &[0, 1, 2]);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();

        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self { vertices, faces }
    }

    /// Find the first face referencing a vertex index out of range.
    ///
    /// Returns `(face_index, face)` for the offending face, or `None` when
    /// every index is below the vertex count.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, Vertex};
    ///
    /// let mut mesh = IndexedMesh::new();
    /// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    /// mesh.faces.push([0, 0, 7]);
    /// assert_eq!(mesh.first_invalid_face(), Some((0, [0, 0, 7])));
    /// ```
    #[must_use]
    pub fn first_invalid_face(&self) -> Option<(usize, [u32; 3])> {
        let count = self.vertices.len();
        self.faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&i| i as usize >= count))
            .map(|(idx, face)| (idx, *face))
    }

    /// Scale mesh uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in &mut self.vertices {
            vertex.position.coords *= factor;
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sum of signed tetrahedra volumes formed by each face and the origin.
    /// Positive for a closed mesh with outward-facing normals; not
    /// meaningful for open meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for tri in self.triangles() {
            let (v0, v1, v2) = (tri.v0.coords, tri.v1.coords, tri.v2.coords);
            volume += v0.dot(&v1.cross(&v2));
        }

        volume / 6.0
    }

    /// Compute the total surface area of the mesh.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let &[i0, i1, i2] = self.faces.get(face_index)?;
        Some(Triangle {
            v0: self.vertices.get(i0 as usize)?.position,
            v1: self.vertices.get(i1 as usize)?.position,
            v2: self.vertices.get(i2 as usize)?.position,
        })
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).filter_map(|idx| self.triangle(idx))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        if self.vertices.is_empty() {
            return Aabb::empty();
        }

        let positions = self.vertices.iter().map(|v| &v.position);
        Aabb::from_points(positions)
    }
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1) with outward-facing normals.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 3
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0)); // 4
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0)); // 5
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0)); // 6
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0)); // 7

    // Bottom face (z=0) - normal points -Z
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);

    // Top face (z=1) - normal points +Z
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);

    // Front face (y=0) - normal points -Y
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);

    // Back face (y=1) - normal points +Y
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);

    // Left face (x=0) - normal points -X
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);

    // Right face (x=1) - normal points +X
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}
