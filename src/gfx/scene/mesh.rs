//! Triangle mesh loading from a restricted Wavefront OBJ subset
//!
//! Only two line kinds are understood:
//!
//! - `v X Y Z` adds one vertex position
//! - `f A B C` adds one triangle from three 1-based vertex indices
//!
//! Everything else (texture coordinates, normals, groups, comments) is ignored.
//! Normals are never read from the file; they are derived per face after the
//! whole file is parsed, see [`Mesh::parse`].

use std::{fs, io, path::Path, path::PathBuf};

use cgmath::{InnerSpace, Vector3};
use thiserror::Error;

/// Errors produced while loading a mesh from disk
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("cannot open mesh file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// CPU-side triangle mesh with one derived normal per vertex
///
/// `positions` and `normals` always have the same length and are indexed
/// identically. `indices` holds whole triangles only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Loads and parses a mesh file
    ///
    /// # Errors
    /// Returns [`MeshError::Open`] when the file cannot be read. Callers treat
    /// this as fatal. Bytes that are not UTF-8 never fail the load; they only
    /// matter on `v`/`f` lines, where they parse like any other bad token.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MeshError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mesh = Self::parse(&String::from_utf8_lossy(&bytes));
        log::info!(
            "Loaded mesh {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parses OBJ text and derives normals
    pub fn parse(text: &str) -> Self {
        let mut positions = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            if let Some(rest) = line.strip_prefix("v ") {
                positions.push(parse_position(rest));
            } else if let Some(rest) = line.strip_prefix("f ") {
                match parse_face(rest) {
                    Some(face) => faces.push(face),
                    None => log::warn!("Skipping malformed face on line {}", line_no + 1),
                }
            }
        }

        let vertex_count = positions.len() as u32;
        let mut indices = Vec::with_capacity(faces.len() * 3);
        for face in faces {
            if face.iter().any(|&i| i >= vertex_count) {
                log::warn!(
                    "Dropping face {:?}: references a vertex past the {} defined",
                    face.map(|i| i + 1),
                    vertex_count
                );
                continue;
            }
            indices.extend_from_slice(&face);
        }

        let mut mesh = Self {
            normals: vec![[0.0; 3]; positions.len()],
            positions,
            indices,
        };
        mesh.compute_flat_normals();
        mesh
    }

    /// Writes each triangle's face normal into its three vertices
    ///
    /// Triangles are visited in index order and later triangles overwrite the
    /// normal of any vertex they share with earlier ones, so a shared vertex
    /// ends up with the normal of the last triangle referencing it. This gives
    /// the faceted look of the model and is not an averaging pass.
    ///
    /// Triangles referencing a vertex that does not exist are skipped.
    fn compute_flat_normals(&mut self) {
        self.normals.resize(self.positions.len(), [0.0; 3]);

        for triangle in self.indices.chunks_exact(3) {
            let [ia, ib, ic] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let (Some(&a), Some(&b), Some(&c)) = (
                self.positions.get(ia),
                self.positions.get(ib),
                self.positions.get(ic),
            ) else {
                continue;
            };
            let (a, b, c) = (Vector3::from(a), Vector3::from(b), Vector3::from(c));

            let cross = (b - a).cross(c - a);
            // Zero-area triangles have no direction to contribute
            if cross.magnitude2() <= f32::EPSILON * f32::EPSILON {
                continue;
            }
            let normal: [f32; 3] = cross.normalize().into();

            self.normals[ia] = normal;
            self.normals[ib] = normal;
            self.normals[ic] = normal;
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// One unit normal per position, or zero where no triangle defined one
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Zero-based vertex indices, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn parse_position(rest: &str) -> [f32; 3] {
    let mut components = rest
        .split_whitespace()
        .map(|token| token.parse::<f32>().unwrap_or(0.0));
    [
        components.next().unwrap_or(0.0),
        components.next().unwrap_or(0.0),
        components.next().unwrap_or(0.0),
    ]
}

/// Returns the zero-based triangle, or `None` when any of the three indices is
/// missing, zero or not a number.
fn parse_face(rest: &str) -> Option<[u32; 3]> {
    let mut tokens = rest.split_whitespace();
    let mut face = [0u32; 3];
    for slot in &mut face {
        let one_based: u32 = tokens.next()?.parse().ok()?;
        *slot = one_based.checked_sub(1)?;
    }
    Some(face)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(actual: [f32; 3], expected: [f32; 3]) {
        for axis in 0..3 {
            assert!(
                (actual[axis] - expected[axis]).abs() < 1e-5,
                "{:?} != {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_vertex_line_yields_position() {
        let mesh = Mesh::parse("v 1.5 -2 0.25\n");
        assert_eq!(mesh.positions(), [[1.5, -2.0, 0.25]]);
        assert_eq!(mesh.normals().len(), 1);
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn test_face_line_is_converted_to_zero_based() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 4 2 3\n");
        assert_eq!(mesh.indices(), vec![3, 1, 2]);
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        let text = "\
# a comment
o Cow
vn 0 1 0
vt 0.5 0.5
v 0 0 0
s off
v 1 0 0
v 0 1 0
usemtl none
f 1 2 3
";
        let mesh = Mesh::parse(text);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_prefix_must_include_the_space() {
        // "vn" and "vt" start with 'v' but are not position lines
        let mesh = Mesh::parse("vn 1 2 3\nvt 1 2\nfoo 1 2 3\n");
        assert!(mesh.positions().is_empty());
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn test_single_triangle_normals() {
        let mesh = Mesh::parse("v 0 0 0\nv 2 0 0\nv 0 3 0\nf 1 2 3\n");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
        for normal in mesh.normals() {
            assert_vec_eq(*normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_shared_vertex_takes_normal_of_last_triangle() {
        // Two triangles sharing the edge 1-2: one in the XY plane facing +Z,
        // one in the XZ plane facing -Y.
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
f 1 2 3
f 1 4 2
";
        let mesh = Mesh::parse(text);
        let first = [0.0, 0.0, 1.0];
        let last = [0.0, 1.0, 0.0];

        // (v4 - v1) x (v2 - v1) = (0,0,1) x (1,0,0) = (0,1,0)
        assert_vec_eq(mesh.normals()[0], last);
        assert_vec_eq(mesh.normals()[1], last);
        assert_vec_eq(mesh.normals()[3], last);
        // Vertex 3 only belongs to the first triangle
        assert_vec_eq(mesh.normals()[2], first);
    }

    #[test]
    fn test_triangle_order_decides_shared_normals() {
        let forward = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 2 3\nf 1 4 2\n");
        let reversed = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 4 2\nf 1 2 3\n");
        assert_vec_eq(forward.normals()[0], [0.0, 1.0, 0.0]);
        assert_vec_eq(reversed.normals()[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_derived_normals_are_unit_length() {
        let mesh = Mesh::parse("v 0 0 0\nv 10 0 0\nv 0 0 -7\nf 1 2 3\n");
        for normal in mesh.normals() {
            let length = Vector3::from(*normal).magnitude();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_malformed_faces_are_skipped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\nf 0 1 2\nf a b c\nf 1 2 3\n";
        let mesh = Mesh::parse(text);
        assert_eq!(mesh.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_faces_past_the_vertex_list_are_dropped() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\nf 3 2 1\n");
        assert_eq!(mesh.indices(), vec![2, 1, 0]);
        assert_eq!(mesh.index_count() % 3, 0);
    }

    #[test]
    fn test_degenerate_triangle_keeps_previous_normal() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 2 0 0\nf 1 2 3\nf 1 2 4\n";
        let mesh = Mesh::parse(text);
        assert_vec_eq(mesh.normals()[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.normals()[3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normals_skip_triangles_past_the_vertex_list() {
        let mut mesh = Mesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            indices: vec![0, 1, 7, 0, 1, 2],
        };
        mesh.compute_flat_normals();
        assert_eq!(mesh.normals().len(), 3);
        assert_vec_eq(mesh.normals()[2], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Mesh::load(dir.path().join("missing.obj")).unwrap_err();
        assert!(matches!(err, MeshError::Open { .. }));
    }
}
