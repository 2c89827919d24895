//! Surface extraction from a distance grid.
//!
//! Naive surface nets: one vertex per cell whose corners straddle the
//! iso-value, placed at the mean of the edge crossings, and one quad per
//! grid edge with a sign change, joining the four cells around it.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Vertex};
use nalgebra::{Point3, Vector3};

use crate::grid::SdfGrid;

/// Corner offsets of a cell.
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Cell edges as pairs of [`CORNERS`] indices.
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Extract the `iso` level set of `grid` as a closed, outward-wound mesh.
///
/// Samples below `iso` are inside. Vertices are in the grid's normalized
/// space. The result is empty when no sample pair straddles `iso`.
///
/// # Example
///
/// ```
/// use mesh_sdf::{extract_surface, SdfGrid};
///
/// // A sphere of radius 0.5 sampled on an 8^3 grid.
/// let r = 8;
/// let mut values = Vec::new();
/// let probe = SdfGrid::new(r, vec![0.0; r * r * r]).unwrap();
/// for i in 0..r {
///     for j in 0..r {
///         for k in 0..r {
///             let p = probe.sample_position(i, j, k);
///             values.push((p.coords.norm() - 0.5) as f32);
///         }
///     }
/// }
/// let grid = SdfGrid::new(r, values).unwrap();
///
/// let surface = extract_surface(&grid, 0.0);
/// assert!(!surface.faces.is_empty());
/// assert!(surface.signed_volume() > 0.0);
/// ```
#[must_use]
pub fn extract_surface(grid: &SdfGrid, iso: f32) -> IndexedMesh {
    let n = grid.resolution();
    let mut mesh = IndexedMesh::new();
    if n < 2 {
        return mesh;
    }

    let inside = |i: usize, j: usize, k: usize| grid.get(i, j, k) < iso;
    let mut cell_vertex: HashMap<[usize; 3], u32> = HashMap::new();

    for i in 0..n - 1 {
        for j in 0..n - 1 {
            for k in 0..n - 1 {
                if let Some(position) = cell_crossing(grid, [i, j, k], iso) {
                    let index = u32::try_from(mesh.vertices.len()).unwrap_or(u32::MAX);
                    mesh.vertices.push(Vertex::new(position));
                    cell_vertex.insert([i, j, k], index);
                }
            }
        }
    }

    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let p = [i, j, k];
                for axis in 0..3 {
                    if p[axis] + 1 >= n {
                        continue;
                    }
                    let mut q = p;
                    q[axis] += 1;
                    let start_inside = inside(p[0], p[1], p[2]);
                    if start_inside == inside(q[0], q[1], q[2]) {
                        continue;
                    }
                    if let Some(quad) = edge_quad(&cell_vertex, p, axis, n) {
                        let [a, b, c, d] = quad;
                        if start_inside {
                            mesh.faces.push([a, b, c]);
                            mesh.faces.push([a, c, d]);
                        } else {
                            mesh.faces.push([a, c, b]);
                            mesh.faces.push([a, d, c]);
                        }
                    }
                }
            }
        }
    }

    mesh
}

/// Mean iso-crossing over the edges of the cell with min corner `cell`.
fn cell_crossing(grid: &SdfGrid, cell: [usize; 3], iso: f32) -> Option<Point3<f64>> {
    let corner = |c: usize| {
        let [di, dj, dk] = CORNERS[c];
        let (i, j, k) = (cell[0] + di, cell[1] + dj, cell[2] + dk);
        (grid.sample_position(i, j, k), f64::from(grid.get(i, j, k) - iso))
    };

    let mut sum = Vector3::zeros();
    let mut count = 0u32;
    for &(a, b) in &EDGES {
        let (pa, va) = corner(a);
        let (pb, vb) = corner(b);
        if (va < 0.0) == (vb < 0.0) {
            continue;
        }
        let t = va / (va - vb);
        sum += pa.coords.lerp(&pb.coords, t);
        count += 1;
    }

    (count > 0).then(|| Point3::from(sum / f64::from(count)))
}

/// The four cell vertices around the grid edge from sample `p` along `axis`,
/// ordered counter-clockwise about `+axis`.
///
/// Returns `None` for edges on the grid boundary, which have fewer than four
/// neighboring cells.
fn edge_quad(
    cell_vertex: &HashMap<[usize; 3], u32>,
    p: [usize; 3],
    axis: usize,
    n: usize,
) -> Option<[u32; 4]> {
    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;
    if p[u] == 0 || p[v] == 0 || p[u] >= n - 1 || p[v] >= n - 1 {
        return None;
    }

    let cell = |su: usize, sv: usize| {
        let mut c = p;
        c[u] = c[u] + su - 1;
        c[v] = c[v] + sv - 1;
        cell_vertex.get(&c).copied()
    };

    Some([cell(0, 0)?, cell(1, 0)?, cell(1, 1)?, cell(0, 1)?])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use mesh_types::MeshTopology;

    fn sampled(r: usize, f: impl Fn(Point3<f64>) -> f64) -> SdfGrid {
        let probe = SdfGrid::new(r, vec![0.0; r * r * r]).unwrap();
        let mut values = Vec::with_capacity(r * r * r);
        for i in 0..r {
            for j in 0..r {
                for k in 0..r {
                    values.push(f(probe.sample_position(i, j, k)) as f32);
                }
            }
        }
        SdfGrid::new(r, values).unwrap()
    }

    #[test]
    fn all_outside_is_empty() {
        let grid = SdfGrid::new(4, vec![1.0; 64]).unwrap();
        let surface = extract_surface(&grid, 0.0);
        assert!(surface.is_empty());
    }

    #[test]
    fn all_inside_is_empty() {
        let grid = SdfGrid::new(4, vec![-1.0; 64]).unwrap();
        assert_eq!(extract_surface(&grid, 0.0).face_count(), 0);
    }

    #[test]
    fn sphere_is_closed_and_outward() {
        let grid = sampled(16, |p| p.coords.norm() - 0.6);
        let surface = extract_surface(&grid, 0.0);
        assert!(surface.first_invalid_face().is_none());

        let mut edges: HashMap<(u32, u32), i32> = HashMap::new();
        for &[a, b, c] in &surface.faces {
            for (x, y) in [(a, b), (b, c), (c, a)] {
                // Directed edges cancel when every edge is shared by two
                // consistently wound faces.
                let key = (x.min(y), x.max(y));
                *edges.entry(key).or_insert(0) += if x < y { 1 } else { -1 };
            }
        }
        assert!(edges.values().all(|&balance| balance == 0));

        let volume = surface.signed_volume();
        let exact = 4.0 / 3.0 * std::f64::consts::PI * 0.6f64.powi(3);
        assert!((volume - exact).abs() < 0.15 * exact, "volume {volume}");
    }

    #[test]
    fn vertices_lie_near_level_set() {
        let grid = sampled(16, |p| p.coords.norm() - 0.6);
        let surface = extract_surface(&grid, 0.0);
        for v in &surface.vertices {
            let r = v.position.coords.norm();
            assert!((r - 0.6).abs() < grid.cell_size(), "radius {r}");
        }
    }

    #[test]
    fn iso_offsets_the_surface() {
        let grid = sampled(16, |p| p.coords.norm() - 0.4);
        let inner = extract_surface(&grid, 0.0).signed_volume();
        let outer = extract_surface(&grid, 0.2).signed_volume();
        assert!(outer > inner);
    }
}
