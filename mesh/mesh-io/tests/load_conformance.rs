//! File-level loading tests covering the inputs a raw mesh directory holds:
//! well-formed OBJ and STL files, empty files and corrupt files.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_io::{IoError, load_mesh, save_obj};
use mesh_types::{MeshTopology, unit_cube};
use std::fs;
use tempfile::tempdir;

const CUBE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

#[test]
fn loads_cube_obj() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cube.obj");
    fs::write(&path, CUBE_OBJ).unwrap();

    let mesh = load_mesh(&path).unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.face_count(), 12);
    assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
}

#[test]
fn uppercase_extension_is_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("My Model (v2).OBJ");
    fs::write(&path, CUBE_OBJ).unwrap();

    assert_eq!(load_mesh(&path).unwrap().face_count(), 12);
}

#[test]
fn saved_obj_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.obj");
    save_obj(&unit_cube(), &path).unwrap();

    let mesh = load_mesh(&path).unwrap();
    assert_eq!(mesh.faces, unit_cube().faces);
}

#[test]
fn empty_obj_is_an_empty_mesh_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.obj");
    fs::write(&path, "").unwrap();

    assert!(matches!(load_mesh(&path), Err(IoError::EmptyMesh)));
}

#[test]
fn vertices_without_faces_is_an_empty_mesh_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("points.obj");
    fs::write(&path, "v 0 0 0\nv 1 1 1\n").unwrap();

    assert!(matches!(load_mesh(&path), Err(IoError::EmptyMesh)));
}

#[test]
fn binary_garbage_obj_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.obj");
    fs::write(&path, [0xFF, 0xFE, 0x00, 0x9C, 0x81, 0x0A, 0xC3]).unwrap();

    assert!(load_mesh(&path).is_err());
}

#[test]
fn empty_stl_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.stl");
    fs::write(&path, "").unwrap();

    assert!(matches!(
        load_mesh(&path),
        Err(IoError::InvalidContent { .. })
    ));
}

#[test]
fn ascii_stl_file_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tri.stl");
    fs::write(
        &path,
        "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\n\
         vertex 0 1 0\nendloop\nendfacet\nendsolid t\n",
    )
    .unwrap();

    let mesh = load_mesh(&path).unwrap();
    assert_eq!(mesh.face_count(), 1);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let result = load_mesh(dir.path().join("absent.stl"));
    assert!(matches!(result, Err(IoError::FileNotFound { .. })));
}
