//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Format Detection
//!
//! - A file whose length is exactly `84 + 50 * face_count` is binary
//! - Otherwise a file starting with "solid" (after optional whitespace) is ASCII
//! - Anything else is parsed as binary and fails on the size mismatch
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, often contains file info)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (often not accurate)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (usually 0)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! Facets are not welded: every facet contributes three fresh vertices.

use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file.
///
/// Automatically detects ASCII vs binary format.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file content is not valid STL
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
///
/// let mesh = load_stl("model.stl").unwrap();
/// println!("Loaded {} faces", mesh.faces.len());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    parse_stl(&bytes)
}

/// Parse STL content held in memory.
///
/// # Errors
///
/// Returns an error if the content is neither valid binary nor valid ASCII STL.
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    if has_binary_layout(bytes) {
        return parse_stl_binary(bytes);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SIZE)]);
    if head.trim_start().starts_with("solid") {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IoError::invalid_content(format!("ASCII STL is not UTF-8: {e}")))?;
        parse_stl_ascii(text)
    } else {
        parse_stl_binary(bytes)
    }
}

/// Whether the byte length matches the face count declared in a binary header.
fn has_binary_layout(bytes: &[u8]) -> bool {
    face_count(bytes).is_some_and(|count| {
        (count as usize)
            .checked_mul(TRIANGLE_SIZE)
            .and_then(|body| body.checked_add(HEADER_SIZE + 4))
            == Some(bytes.len())
    })
}

fn face_count(bytes: &[u8]) -> Option<u32> {
    let raw = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Parse a binary STL body.
fn parse_stl_binary(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let face_count = face_count(bytes).ok_or(IoError::InvalidHeader {
        expected: HEADER_SIZE + 4,
        got: bytes.len(),
    })?;

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < face_count as usize {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: available < face_count, which fits in u32
        let got = available as u32;
        return Err(IoError::InvalidFaceCount {
            expected: face_count,
            got,
        });
    }

    let mut mesh = IndexedMesh::with_capacity((face_count as usize) * 3, face_count as usize);

    for triangle in body.chunks_exact(TRIANGLE_SIZE).take(face_count as usize) {
        // Skip normal (12 bytes), read 3 vertices (36 bytes total)
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
        let base_idx = mesh.vertices.len() as u32;
        mesh.vertices.push(read_vertex(&triangle[12..24]));
        mesh.vertices.push(read_vertex(&triangle[24..36]));
        mesh.vertices.push(read_vertex(&triangle[36..48]));
        mesh.faces.push([base_idx, base_idx + 1, base_idx + 2]);
    }

    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8]) -> Vertex {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z))
}

/// Parse an ASCII STL document.
fn parse_stl_ascii(text: &str) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut in_loop = false;
    let mut vertices_in_face: Vec<Vertex> = Vec::with_capacity(3);

    for (line_idx, line) in text.lines().enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            continue;
        };

        match keyword.to_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                vertices_in_face.clear();
            }
            "vertex" => {
                if !in_loop || parts.len() < 4 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: malformed vertex record",
                        line_idx + 1
                    )));
                }
                let x: f64 = parts[1].parse()?;
                let y: f64 = parts[2].parse()?;
                let z: f64 = parts[3].parse()?;
                vertices_in_face.push(Vertex::from_coords(x, y, z));
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if vertices_in_face.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: facet has {} vertices, expected 3",
                        line_idx + 1,
                        vertices_in_face.len()
                    )));
                }
                #[allow(clippy::cast_possible_truncation)]
                // Truncation: mesh indices are u32, meshes with >4B vertices unsupported
                let base_idx = mesh.vertices.len() as u32;
                mesh.vertices.append(&mut vertices_in_face);
                mesh.faces.push([base_idx, base_idx + 1, base_idx + 2]);
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(mesh)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use mesh_types::MeshTopology;

    fn binary_stl(triangles: &[[[f32; 3]; 3]], header_text: &[u8]) -> Vec<u8> {
        let mut bytes = vec![b' '; HEADER_SIZE];
        bytes[..header_text.len()].copy_from_slice(header_text);
        let count = u32::try_from(triangles.len()).unwrap();
        bytes.extend_from_slice(&count.to_le_bytes());
        for tri in triangles {
            bytes.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    const TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn binary_stl_parsing() {
        let bytes = binary_stl(&[TRI, TRI], b"exported");
        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.faces[1], [3, 4, 5]);
        assert_eq!(mesh.vertices[1].position.x, 1.0);
    }

    #[test]
    fn binary_stl_with_solid_header() {
        // Some exporters write "solid" into a binary header.
        let bytes = binary_stl(&[TRI], b"solid exported by a CAD tool");
        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut bytes = binary_stl(&[TRI, TRI], b"exported");
        bytes.truncate(bytes.len() - 20);
        assert!(matches!(
            parse_stl(&bytes),
            Err(IoError::InvalidFaceCount { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn ascii_stl_parsing() {
        let ascii_stl = br#"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test"#;

        let mesh = parse_stl(ascii_stl).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn ascii_facet_with_missing_vertex_is_rejected() {
        let ascii_stl = br#"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid test"#;

        assert!(matches!(
            parse_stl(ascii_stl),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn tiny_file_is_rejected() {
        assert!(parse_stl(b"sol").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let bytes = vec![0xABu8; 300];
        assert!(parse_stl(&bytes).is_err());
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_stl("nonexistent_file_12345.stl");
        assert!(result.is_err());
        if let Err(IoError::FileNotFound { path }) = result {
            assert!(path.to_string_lossy().contains("nonexistent"));
        }
    }
}
