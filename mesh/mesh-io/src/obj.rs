//! Wavefront OBJ support.
//!
//! Only geometry is read: `v` records and `f` records. Texture coordinates,
//! normals, groups, objects and materials are ignored, so every object in
//! the file ends up in the same mesh.
//!
//! # Face Records
//!
//! ```text
//! f 1 2 3            vertex indices
//! f 1/1 2/2 3/3      vertex/texture
//! f 1//1 2//2 3//3   vertex//normal
//! f -3 -2 -1         relative to the most recent vertex
//! f 1 2 3 4          polygons are fan-triangulated
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};

use crate::error::{IoError, IoResult};

/// Load a mesh from an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a record is malformed, or a
/// face references a vertex that does not exist.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_obj;
///
/// let mesh = load_obj("model.obj").unwrap();
/// println!("Loaded {} faces", mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    parse_obj(BufReader::new(file))
}

/// Parse OBJ content from a reader.
///
/// # Errors
///
/// Returns an error if a record is malformed or a face index is out of range.
pub fn parse_obj<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut polygon: Vec<u32> = Vec::with_capacity(4);

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                IoError::invalid_content(format!("line {}: not valid UTF-8", line_idx + 1))
            } else {
                IoError::Io(e)
            }
        })?;
        let content = line.split('#').next().unwrap_or_default();
        let mut parts = content.split_whitespace();

        match parts.next() {
            Some("v") => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: vertex needs 3 coordinates, got {}",
                        line_idx + 1,
                        coords.len()
                    )));
                }
                let x: f64 = coords[0].parse()?;
                let y: f64 = coords[1].parse()?;
                let z: f64 = coords[2].parse()?;
                mesh.vertices.push(Vertex::from_coords(x, y, z));
            }
            Some("f") => {
                polygon.clear();
                for corner in parts {
                    let index = resolve_index(corner, mesh.vertices.len()).ok_or_else(|| {
                        IoError::invalid_content(format!(
                            "line {}: invalid face corner '{corner}'",
                            line_idx + 1
                        ))
                    })?;
                    polygon.push(index);
                }
                if polygon.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: face needs at least 3 corners, got {}",
                        line_idx + 1,
                        polygon.len()
                    )));
                }
                for i in 1..polygon.len() - 1 {
                    mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if let Some((face_idx, face)) = mesh.first_invalid_face() {
        return Err(IoError::invalid_content(format!(
            "face {face_idx} {face:?} references a missing vertex ({} vertices)",
            mesh.vertices.len()
        )));
    }

    Ok(mesh)
}

/// Resolve one face corner (`i`, `i/t`, `i//n`, `i/t/n`) to a 0-based index.
///
/// Negative indices count back from `vertex_count`. Returns `None` for a
/// zero index, a relative index reaching before the first vertex, or an
/// unparseable token.
fn resolve_index(corner: &str, vertex_count: usize) -> Option<u32> {
    let raw: i64 = corner.split('/').next()?.parse().ok()?;
    let resolved = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => i64::try_from(vertex_count).ok()? + r,
    };
    u32::try_from(resolved).ok()
}

/// Save a mesh to an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text (`v` then `f` records, 1-based indices).
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_obj<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    for vertex in &mesh.vertices {
        let p = vertex.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for &[a, b, c] in &mesh.faces {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, unit_cube};

    fn parse(text: &str) -> IoResult<IndexedMesh> {
        parse_obj(text.as_bytes())
    }

    #[test]
    fn parses_triangle() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn ignores_comments_and_attributes() {
        let text = "# header\nmtllib a.mtl\no first\nv 0 0 0 # origin\nv 1 0 0\nv 0 1 0\n\
                    vt 0 0\nvn 0 0 1\nusemtl red\ns off\nf 1/1/1 2/1/1 3/1/1\n";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn slash_forms_resolve_vertex_index() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\nf 3/1 2/1 1/1\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [2, 1, 0]]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn quads_are_fan_triangulated() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn multiple_objects_are_merged() {
        let text = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                    o b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 4 5 6\n";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
    }

    #[test]
    fn zero_index_is_rejected() {
        assert!(matches!(
            parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(matches!(
            parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n"),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn malformed_vertex_is_rejected() {
        assert!(parse("v 0 zero 0\n").is_err());
        assert!(matches!(parse("v 0 0\n"), Err(IoError::InvalidContent { .. })));
    }

    #[test]
    fn short_face_is_rejected() {
        assert!(parse("v 0 0 0\nv 1 0 0\nf 1 2\n").is_err());
    }

    #[test]
    fn empty_input_yields_empty_mesh() {
        let mesh = parse("").unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn roundtrip_through_writer() {
        let cube = unit_cube();
        let mut buf = Vec::new();
        write_obj(&cube, &mut buf).unwrap();

        let loaded = parse_obj(buf.as_slice()).unwrap();
        assert_eq!(loaded.faces, cube.faces);
        assert_eq!(loaded.vertex_count(), cube.vertex_count());
        for (a, b) in loaded.vertices.iter().zip(&cube.vertices) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_obj("nonexistent_file_12345.obj");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }
}
