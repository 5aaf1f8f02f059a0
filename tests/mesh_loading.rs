use std::io::Write;

use phong_viewer::gfx::scene::{Mesh, MeshError};

fn write_obj(contents: &str) -> tempfile::NamedTempFile {
    write_obj_bytes(contents.as_bytes())
}

fn write_obj_bytes(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn one_triangle_file_loads_with_shared_normal() {
    let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    let mesh = Mesh::load(file.path()).unwrap();

    assert_eq!(mesh.positions(), [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(mesh.indices(), [0, 1, 2]);
    assert_eq!(mesh.normals(), [[0.0, 0.0, 1.0]; 3]);
    assert_eq!(mesh.index_count(), 3);
}

#[test]
fn unknown_lines_are_ignored() {
    let file = write_obj(
        "# comment\nmtllib cow.mtl\no Cow\nv 0 0 0\nvn 0 0 1\nv 1 0 0\nvt 0.5 0.5\nv 0 1 0\ns off\nf 1 2 3\n",
    );
    let mesh = Mesh::load(file.path()).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn latin1_comment_does_not_fail_the_load() {
    let file = write_obj_bytes(b"# Autor: J\xfcrgen\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    let mesh = Mesh::load(file.path()).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.indices(), [0, 1, 2]);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Mesh::load(dir.path().join("absent.obj")).unwrap_err();
    assert!(matches!(err, MeshError::Open { .. }));
}

#[test]
fn bundled_model_is_a_closed_cube() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/model.obj");
    let mesh = Mesh::load(path).unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    for normal in mesh.normals() {
        let length = (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2]).sqrt();
        assert!((length - 1.0).abs() < 1e-5);
    }
}
