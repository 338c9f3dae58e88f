use crate::core::pipeline::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

/// Triangulated geometry as imported. Immutable once the scene is built.
///
/// Attributes are optional: an OBJ without `vn` lines has no normals, one
/// without `vt` lines has no texture coordinates.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Option<Vec<Point3<f32>>>,
    pub normals: Option<Vec<Vector3<f32>>>,
    pub texcoords: Option<Vec<Vector2<f32>>>,
    pub faces: Vec<[u32; 3]>,
    pub material_index: Option<usize>,
}

/// Vertex and index buffers built once per mesh at load time.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Mesh {
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of indices a draw of this mesh requests (three per triangle).
    pub fn index_count(&self) -> usize {
        self.faces.len() * 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    /// Builds the interleaved buffers, or `None` when there is nothing to draw.
    ///
    /// Missing normals and texture coordinates are zero-filled; faces that refer
    /// past the end of the position list are dropped.
    pub fn build_buffers(&self) -> Option<MeshBuffers> {
        let positions = self.positions.as_ref().filter(|p| !p.is_empty())?;
        if self.faces.is_empty() {
            return None;
        }

        let normals = self.normals.as_ref().filter(|n| n.len() == positions.len());
        let texcoords = self
            .texcoords
            .as_ref()
            .filter(|t| t.len() == positions.len());

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Vertex::new(
                    *p,
                    normals.map_or_else(Vector3::zeros, |n| n[i]),
                    texcoords.map_or_else(Vector2::zeros, |t| t[i]),
                )
            })
            .collect::<Vec<_>>();

        let limit = vertices.len() as u32;
        let indices = self
            .faces
            .iter()
            .filter(|f| f.iter().all(|&i| i < limit))
            .flatten()
            .copied()
            .collect::<Vec<_>>();

        if indices.is_empty() {
            return None;
        }
        Some(MeshBuffers { vertices, indices })
    }

    /// A unit quad in the XY plane facing +Z, made of two counter-clockwise triangles.
    pub fn quad(name: &str, material_index: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            positions: Some(vec![
                Point3::new(-0.5, -0.5, 0.0),
                Point3::new(0.5, -0.5, 0.0),
                Point3::new(0.5, 0.5, 0.0),
                Point3::new(-0.5, 0.5, 0.0),
            ]),
            normals: Some(vec![Vector3::z(); 4]),
            texcoords: Some(vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ]),
            faces: vec![[0, 1, 2], [0, 2, 3]],
            material_index,
        }
    }
}
